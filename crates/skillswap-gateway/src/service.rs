use crate::cli::{Command, RequestFilter};
use crate::config::Config;
use anyhow::{Context, Result};
use serde::Serialize;
use skillswap_lifecycle::{Recommender, SwapService, UserDirectory};
use skillswap_matching::RecommendationEngine;
use skillswap_persistence::PersistenceService;
use skillswap_provider::LlmOracle;
use skillswap_types::{AvailabilitySelection, ProfileUpdate, RequestId, UserId};
use std::sync::Arc;
use tracing::{error, info};

/// Gateway service - wires the stores, oracle and services behind the CLI
pub struct GatewayService {
    config: Config,
}

impl GatewayService {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run one command and print its result as JSON on stdout
    pub async fn run(self, command: Command) -> Result<()> {
        skillswap_logging::init_logging(&self.config.logging.level)?;

        let store = Arc::new(
            PersistenceService::new(&self.config.database.path)
                .await
                .with_context(|| format!("Failed to open {}", self.config.database.path))?,
        );
        let directory = UserDirectory::new(store.clone());
        let swaps = SwapService::new(store.clone(), store.clone(), store.clone());

        match command {
            Command::Register { id, name, email } => {
                print_json(&directory.register_user(&id, &name, &email).await?)
            }
            Command::Profile {
                user,
                name,
                bio,
                avatar,
                offers,
                wants,
                availability,
                days,
                slots,
            } => {
                let user = UserId::from(user);
                let mut update = ProfileUpdate {
                    name,
                    bio,
                    avatar_url: avatar,
                    skills_offered: offers,
                    skills_wanted: wants,
                    availability,
                };
                if !days.is_empty() || !slots.is_empty() {
                    update = update.with_selection(&AvailabilitySelection {
                        days,
                        slots: slots.into_iter().map(|s| s.as_domain()).collect(),
                    });
                }

                let edits = update.name.is_some()
                    || update.bio.is_some()
                    || update.avatar_url.is_some()
                    || update.skills_offered.is_some()
                    || update.skills_wanted.is_some()
                    || update.availability.is_some();
                let profile = if edits {
                    directory.update_profile(&user, &user, update).await?
                } else {
                    directory.get_user(&user).await?
                };
                print_json(&profile)
            }
            Command::Search {
                viewer,
                query,
                skill,
                page,
                per_page,
            } => print_json(
                &directory
                    .search_users(
                        &UserId::from(viewer),
                        query.as_deref(),
                        skill.as_deref(),
                        page,
                        per_page,
                    )
                    .await?,
            ),
            Command::Propose {
                from,
                to,
                offer,
                want,
                message,
            } => print_json(
                &swaps
                    .propose_swap(
                        &UserId::from(from),
                        &UserId::from(to),
                        &offer,
                        &want,
                        message,
                    )
                    .await?,
            ),
            Command::Transition {
                request,
                actor,
                action,
            } => print_json(
                &swaps
                    .transition_swap(
                        &RequestId::from(request),
                        &UserId::from(actor),
                        action.target(),
                    )
                    .await?,
            ),
            Command::Rate {
                request,
                actor,
                rated,
                value,
                comment,
            } => {
                let rated = UserId::from(rated);
                swaps
                    .submit_rating(
                        &RequestId::from(request),
                        &UserId::from(actor),
                        &rated,
                        value,
                        comment,
                    )
                    .await?;
                print_json(&directory.get_user(&rated).await?)
            }
            Command::Post {
                request,
                actor,
                text,
            } => print_json(
                &swaps
                    .post_message(&RequestId::from(request), &UserId::from(actor), &text)
                    .await?,
            ),
            Command::Messages { request, viewer } => print_json(
                &swaps
                    .messages(&RequestId::from(request), &UserId::from(viewer))
                    .await?,
            ),
            Command::Requests { user, filter } => {
                let user = UserId::from(user);
                let views = match filter {
                    RequestFilter::Incoming => swaps.incoming_requests(&user).await?,
                    RequestFilter::Outgoing => swaps.outgoing_requests(&user).await?,
                    RequestFilter::Pending => swaps.pending_incoming(&user).await?,
                };
                print_json(&views)
            }
            Command::Sessions { user } => print_json(&swaps.sessions(&UserId::from(user)).await?),
            Command::Reviews { user } => {
                print_json(&swaps.reviews_for(&UserId::from(user)).await?)
            }
            Command::Recommend { user, count } => {
                let provider = self.config.provider();
                info!("Using recommendation model: {}", provider.model());
                let engine = RecommendationEngine::with_config(
                    Arc::new(LlmOracle::new(provider)),
                    self.config.recommendation_config(),
                );
                let recommender = Recommender::new(store, engine);

                match recommender.recommend_for(&UserId::from(user), count).await {
                    Ok(recs) => print_json(&recs),
                    Err(e) => {
                        if e.is_retryable() {
                            error!("Recommendation failed, retry later: {}", e);
                        }
                        Err(e.into())
                    }
                }
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
