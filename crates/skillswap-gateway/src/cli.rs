use chrono::Weekday;
use clap::{Parser, Subcommand, ValueEnum};
use skillswap_types::{SwapStatus, TimeSlot};

#[derive(Parser, Debug)]
#[command(name = "skillswap-gateway")]
#[command(about = "Skill exchange: profiles, swap requests, sessions and recommendations", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Database file (overrides config)
    #[arg(long, global = true)]
    pub database: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a user with an empty profile
    Register {
        id: String,
        name: String,
        email: String,
    },
    /// Show a profile, or edit it when any field flag is given
    Profile {
        user: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
        /// Comma-separated skills offered
        #[arg(long, value_delimiter = ',')]
        offers: Option<Vec<String>>,
        /// Comma-separated skills wanted
        #[arg(long, value_delimiter = ',')]
        wants: Option<Vec<String>>,
        /// Free-text availability
        #[arg(long, conflicts_with_all = ["days", "slots"])]
        availability: Option<String>,
        /// Available days, e.g. mon,wed
        #[arg(long, value_delimiter = ',')]
        days: Vec<Weekday>,
        #[arg(long, value_delimiter = ',', value_enum)]
        slots: Vec<SlotFlag>,
    },
    /// Browse other users
    Search {
        viewer: String,
        #[arg(long, short = 'q')]
        query: Option<String>,
        #[arg(long)]
        skill: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 10)]
        per_page: usize,
    },
    /// Send a swap request
    Propose {
        from: String,
        to: String,
        /// Skill you teach
        #[arg(long)]
        offer: String,
        /// Skill you want from them
        #[arg(long)]
        want: String,
        #[arg(long)]
        message: Option<String>,
    },
    /// Accept, reject or complete a request
    Transition {
        request: String,
        actor: String,
        #[arg(value_enum)]
        action: TransitionAction,
    },
    /// Rate the other participant of a completed swap
    Rate {
        request: String,
        actor: String,
        rated: String,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=5))]
        value: u8,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Post into an accepted swap's chat
    Post {
        request: String,
        actor: String,
        text: String,
    },
    /// Read a swap's chat history
    Messages { request: String, viewer: String },
    /// List requests for a user
    Requests {
        user: String,
        #[arg(long, value_enum, default_value = "incoming")]
        filter: RequestFilter,
    },
    /// Active and completed sessions of a user
    Sessions { user: String },
    /// Reviews a user has received
    Reviews { user: String },
    /// Recommended swap partners for a user
    Recommend {
        user: String,
        #[arg(long, short = 'n')]
        count: Option<usize>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, ValueEnum)]
pub enum TransitionAction {
    Accept,
    Reject,
    Complete,
}

impl TransitionAction {
    pub const fn target(self) -> SwapStatus {
        match self {
            TransitionAction::Accept => SwapStatus::Accepted,
            TransitionAction::Reject => SwapStatus::Rejected,
            TransitionAction::Complete => SwapStatus::Completed,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, ValueEnum)]
pub enum RequestFilter {
    Incoming,
    Outgoing,
    /// Incoming and still pending
    Pending,
}

#[derive(Copy, Clone, Debug, PartialEq, ValueEnum)]
pub enum SlotFlag {
    Mornings,
    Afternoons,
    Evenings,
}

impl SlotFlag {
    pub const fn as_domain(self) -> TimeSlot {
        match self {
            SlotFlag::Mornings => TimeSlot::Mornings,
            SlotFlag::Afternoons => TimeSlot::Afternoons,
            SlotFlag::Evenings => TimeSlot::Evenings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_profile_edit() {
        let cli = Cli::try_parse_from([
            "skillswap-gateway",
            "profile",
            "alice",
            "--offers",
            "Guitar,React",
            "--days",
            "mon,sat",
            "--slots",
            "evenings",
        ])
        .unwrap();

        match cli.command {
            Command::Profile {
                user,
                offers,
                days,
                slots,
                availability,
                ..
            } => {
                assert_eq!(user, "alice");
                assert_eq!(offers.unwrap(), vec!["Guitar", "React"]);
                assert_eq!(days, vec![Weekday::Mon, Weekday::Sat]);
                assert_eq!(slots, vec![SlotFlag::Evenings]);
                assert!(availability.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_rating_value_is_range_checked() {
        assert!(Cli::try_parse_from(["skillswap-gateway", "rate", "r1", "a", "b", "6"]).is_err());

        let cli =
            Cli::try_parse_from(["skillswap-gateway", "transition", "r1", "bob", "accept"]).unwrap();
        match cli.command {
            Command::Transition { action, .. } => {
                assert_eq!(action.target(), SwapStatus::Accepted)
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
