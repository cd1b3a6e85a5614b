use serde::Serialize;
use skillswap_persistence::UserStore;
use skillswap_types::{ProfileUpdate, Result, SkillSwapError, User, UserId};
use std::sync::Arc;
use tracing::info;

/// One page of a listing; pages are 1-based
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    fn slice(all: Vec<T>, page: usize, per_page: usize) -> Self {
        let total = all.len();
        let items = all
            .into_iter()
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .collect();
        Self {
            items,
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        }
    }
}

/// Users directory operations
pub struct UserDirectory {
    users: Arc<dyn UserStore>,
}

impl UserDirectory {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Create a user with an empty profile and no rating
    pub async fn register_user(&self, id: &str, name: &str, email: &str) -> Result<User> {
        let id = id.trim();
        let name = name.trim();
        let email = email.trim();
        if id.is_empty() {
            return Err(SkillSwapError::Validation("user id cannot be empty".into()));
        }
        if name.is_empty() {
            return Err(SkillSwapError::Validation("name cannot be empty".into()));
        }
        if email.is_empty() {
            return Err(SkillSwapError::Validation("email cannot be empty".into()));
        }

        let user = User::new(id, name, email);
        self.users.insert_user(&user).await?;
        info!(user = %user.id, "Registered user");
        Ok(user)
    }

    pub async fn get_user(&self, id: &UserId) -> Result<User> {
        self.users
            .get_user(id)
            .await?
            .ok_or_else(|| SkillSwapError::not_found("User", id))
    }

    /// Apply a profile edit on behalf of its owner
    pub async fn update_profile(
        &self,
        actor: &UserId,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User> {
        if actor != user_id {
            return Err(SkillSwapError::unauthorized(
                actor,
                format!("edit the profile of '{user_id}'"),
            ));
        }

        let mut user = self.get_user(user_id).await?;
        user.apply_update(update)?;
        self.users.save_profile(&user).await?;
        info!(
            user = %user.id,
            complete = user.is_complete(),
            "Updated profile"
        );
        Ok(user)
    }

    /// Browse other users
    ///
    /// `query` matches name or any skill as a case-insensitive substring;
    /// `skill` must equal one offered or wanted skill, ignoring case.
    pub async fn search_users(
        &self,
        viewer: &UserId,
        query: Option<&str>,
        skill: Option<&str>,
        page: usize,
        per_page: usize,
    ) -> Result<Page<User>> {
        if page == 0 || per_page == 0 {
            return Err(SkillSwapError::Validation(
                "page and per_page must be positive".into(),
            ));
        }

        let query = query
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());
        let skill = skill.map(str::trim).filter(|s| !s.is_empty());

        let matches: Vec<User> = self
            .users
            .list_users()
            .await?
            .into_iter()
            .filter(|u| u.id != *viewer)
            .filter(|u| match &query {
                Some(q) => {
                    u.name.to_lowercase().contains(q.as_str())
                        || u
                            .skills_offered
                            .iter()
                            .chain(&u.skills_wanted)
                            .any(|s| s.to_lowercase().contains(q.as_str()))
                }
                None => true,
            })
            .filter(|u| match skill {
                Some(s) => u.offered_skill(s).is_some() || u.wanted_skill(s).is_some(),
                None => true,
            })
            .collect();

        Ok(Page::slice(matches, page, per_page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_slice() {
        let page = Page::slice((1..=7).collect::<Vec<_>>(), 2, 3);
        assert_eq!(page.items, vec![4, 5, 6]);
        assert_eq!(page.total, 7);
        assert_eq!(page.total_pages, 3);

        let past_end = Page::slice((1..=7).collect::<Vec<_>>(), 4, 3);
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total_pages, 3);

        let empty = Page::slice(Vec::<u8>::new(), 1, 10);
        assert_eq!(empty.total_pages, 0);
    }
}
