//! Room naming scheme.
//!
//! Rooms are flat strings with a `kind:key` shape. A session is
//! auto-joined to its identity and role rooms on connect; student
//! sessions also get their course and batch rooms.

use uuid::Uuid;

use nightingale_entity::student::Student;
use nightingale_entity::user::UserRole;

/// Room watched by administrative dashboards.
pub const ADMIN_NOTIFICATIONS: &str = "admin:notifications";

/// Room addressing all sessions of one identity.
pub fn user_room(user_id: Uuid) -> String {
    format!("user:{user_id}")
}

/// Room addressing all sessions of one role.
pub fn role_room(role: UserRole) -> String {
    format!("role:{role}")
}

/// Room addressing students of one course.
pub fn course_room(course_id: &str) -> String {
    format!("course:{course_id}")
}

/// Room addressing students of one batch year.
pub fn batch_room(batch_year: i32) -> String {
    format!("batch:{batch_year}")
}

/// Rooms a session joins automatically on connect.
pub fn default_rooms(user_id: Uuid, role: UserRole, student: Option<&Student>) -> Vec<String> {
    let mut rooms = vec![user_room(user_id), role_room(role)];
    if role == UserRole::Admin {
        rooms.push(ADMIN_NOTIFICATIONS.to_string());
    }
    if let Some(student) = student {
        rooms.push(course_room(&student.course_id));
        rooms.push(batch_room(student.batch_year));
    }
    rooms
}

/// Whether a session may join a room it asked for.
///
/// Identity rooms are private to their owner and the admin monitoring
/// room needs the admin role; everything else is open.
pub fn can_join(user_id: Uuid, role: UserRole, room: &str) -> bool {
    if room == ADMIN_NOTIFICATIONS {
        return role == UserRole::Admin;
    }
    if let Some(owner) = room.strip_prefix("user:") {
        return owner == user_id.to_string();
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn student(course: &str, batch: i32) -> Student {
        let now = Utc::now();
        Student {
            id: Uuid::new_v4(),
            user_id: Some(Uuid::new_v4()),
            course_id: course.into(),
            batch_year: batch,
            status: nightingale_entity::student::AcademicStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_default_rooms_for_student_session() {
        let id = Uuid::new_v4();
        let s = student("bsc-nursing", 2024);
        let rooms = default_rooms(id, UserRole::Student, Some(&s));
        assert!(rooms.contains(&format!("user:{id}")));
        assert!(rooms.contains(&"role:student".to_string()));
        assert!(rooms.contains(&"course:bsc-nursing".to_string()));
        assert!(rooms.contains(&"batch:2024".to_string()));
        assert!(!rooms.contains(&ADMIN_NOTIFICATIONS.to_string()));
    }

    #[test]
    fn test_admins_auto_join_monitoring_room() {
        let rooms = default_rooms(Uuid::new_v4(), UserRole::Admin, None);
        assert!(rooms.contains(&ADMIN_NOTIFICATIONS.to_string()));
    }

    #[test]
    fn test_admin_room_is_guarded() {
        let id = Uuid::new_v4();
        assert!(!can_join(id, UserRole::Student, ADMIN_NOTIFICATIONS));
        assert!(can_join(id, UserRole::Admin, ADMIN_NOTIFICATIONS));
    }

    #[test]
    fn test_identity_rooms_are_private() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        assert!(can_join(me, UserRole::Student, &user_room(me)));
        assert!(!can_join(me, UserRole::Student, &user_room(other)));
    }

    #[test]
    fn test_course_rooms_are_open() {
        assert!(can_join(Uuid::new_v4(), UserRole::Student, "course:gnm"));
    }
}
