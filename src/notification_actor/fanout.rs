use crate::domain::{Audience, Conversation, Notification};

/// Shown in `uid`'s feed: addressed to them, or unaddressed and aimed at
/// users or everyone.
pub fn visible_to_user(n: &Notification, uid: &str) -> bool {
    match &n.user_id {
        Some(owner) => owner == uid,
        None => matches!(n.target, Audience::User | Audience::All),
    }
}

/// Shown in the admin feed: aimed at admins or everyone, whoever owns it.
pub fn visible_to_admin(n: &Notification) -> bool {
    matches!(n.target, Audience::Admin | Audience::All)
}

/// Counts toward `uid`'s unread badge.
pub fn unread_for_user(n: &Notification, uid: &str) -> bool {
    !n.read && n.user_id.as_deref().map_or(true, |owner| owner == uid)
}

/// Counts toward the admin unread badge.
pub fn unread_for_admin(n: &Notification) -> bool {
    !n.read && n.user_id.is_none()
}

/// Admin badge: unaddressed unread notifications plus support threads
/// transferred to an admin and not yet answered.
pub fn admin_unread_count(notifications: &[Notification], conversations: &[Conversation]) -> usize {
    let system = notifications.iter().filter(|n| unread_for_admin(n)).count();
    let threads = conversations.iter().filter(|c| c.awaits_admin()).count();
    system + threads
}

/// Newest first, ties broken by id so the order is stable.
pub fn sort_newest_first(notifications: &mut [Notification]) {
    notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NotificationKind;
    use chrono::{Duration, Utc};

    fn note(id: &str, user_id: Option<&str>, target: Audience, read: bool) -> Notification {
        Notification {
            id: id.into(),
            user_id: user_id.map(str::to_string),
            target,
            title: "t".into(),
            message: "m".into(),
            kind: NotificationKind::System,
            link: None,
            read,
            created_at: Utc::now(),
        }
    }

    fn log() -> Vec<Notification> {
        vec![
            note("n1", Some("u1"), Audience::User, false),
            note("n2", Some("u2"), Audience::User, false),
            note("n3", None, Audience::Admin, false),
            note("n4", None, Audience::All, false),
            note("n5", Some("u1"), Audience::All, true),
            note("n6", None, Audience::User, false),
            note("n7", Some("u1"), Audience::Admin, false),
        ]
    }

    fn ids(filtered: Vec<&Notification>) -> Vec<&str> {
        filtered.into_iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_user_feed() {
        let log = log();
        let feed = ids(log.iter().filter(|n| visible_to_user(n, "u1")).collect());
        assert_eq!(feed, vec!["n1", "n4", "n5", "n6", "n7"]);
    }

    #[test]
    fn test_admin_feed_includes_all_and_excludes_user_targeted() {
        let log = log();
        let feed = ids(log.iter().filter(|n| visible_to_admin(n)).collect());
        assert_eq!(feed, vec!["n3", "n4", "n5", "n7"]);
        assert!(log
            .iter()
            .filter(|n| n.target == Audience::User && n.user_id.is_some())
            .all(|n| !visible_to_admin(n)));
    }

    #[test]
    fn test_user_unread_counts_unaddressed_regardless_of_target() {
        let log = log();
        // n3 is admin-targeted but unaddressed, so it counts; n5 is read.
        let unread = ids(log.iter().filter(|n| unread_for_user(n, "u1")).collect());
        assert_eq!(unread, vec!["n1", "n3", "n4", "n6", "n7"]);
    }

    #[test]
    fn test_admin_unread_includes_waiting_threads() {
        let now = Utc::now();
        let threads = vec![
            Conversation {
                id: "c1".into(),
                user_id: "u1".into(),
                transferred_to_admin: true,
                admin_replied: false,
                updated_at: now,
            },
            Conversation {
                id: "c2".into(),
                user_id: "u2".into(),
                transferred_to_admin: true,
                admin_replied: true,
                updated_at: now,
            },
            Conversation {
                id: "c3".into(),
                user_id: "u3".into(),
                transferred_to_admin: false,
                admin_replied: false,
                updated_at: now,
            },
        ];
        // n3, n4, n6 are unaddressed and unread.
        assert_eq!(admin_unread_count(&log(), &threads), 4);
    }

    #[test]
    fn test_sort_newest_first() {
        let mut log = log();
        let base = Utc::now();
        for (i, n) in log.iter_mut().enumerate() {
            n.created_at = base + Duration::seconds(i as i64);
        }
        sort_newest_first(&mut log);
        assert_eq!(log.first().map(|n| n.id.as_str()), Some("n7"));
        assert_eq!(log.last().map(|n| n.id.as_str()), Some("n1"));
    }
}
