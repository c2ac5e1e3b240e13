use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AnnouncementEntity {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub is_active: bool,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnnouncementEntity {
    /// Active and inside its (optional, inclusive) window.
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.starts_at.map_or(true, |start| start <= now)
            && self.ends_at.map_or(true, |end| now <= end)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn announcement(is_active: bool) -> AnnouncementEntity {
        AnnouncementEntity {
            id: Uuid::now_v7(),
            title: "Open house".into(),
            content: "Saturday 10am".into(),
            is_active,
            starts_at: None,
            ends_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let now = Utc::now();
        let mut a = announcement(true);
        assert!(a.is_visible_at(now));

        a.starts_at = Some(now);
        a.ends_at = Some(now);
        assert!(a.is_visible_at(now));
        assert!(!a.is_visible_at(now + Duration::seconds(1)));
        assert!(!a.is_visible_at(now - Duration::seconds(1)));
    }

    #[test]
    fn inactive_is_never_visible() {
        assert!(!announcement(false).is_visible_at(Utc::now()));
    }
}
