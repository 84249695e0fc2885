//! Role and ownership checks.
//!
//! Admin privilege always overrides ownership.

use rental_core::booking::Booking;
use rental_core::user::User;
use tracing::debug;
use uuid::Uuid;

use super::{AuthError, Claims};

pub fn require_admin(claims: &Claims) -> Result<(), AuthError> {
    if claims.is_admin() {
        return Ok(());
    }
    deny(claims, "Not authorized")
}

pub fn require_owner_or_admin(claims: &Claims, owner: Uuid) -> Result<(), AuthError> {
    if claims.is_admin() || claims.id == owner {
        return Ok(());
    }
    deny(claims, "Not authorized to modify this resource")
}

/// Matched on account id, so a token outliving its account never grants
/// access to a later account registered under the same username
pub fn require_self_or_admin(claims: &Claims, user: &User) -> Result<(), AuthError> {
    if claims.is_admin() || claims.id == user.id {
        return Ok(());
    }
    deny(claims, "Not authorized to modify this user")
}

/// Guest, host of the booked listing, or admin
pub fn require_booking_viewer(
    claims: &Claims,
    booking: &Booking,
    listing_host: Option<Uuid>,
) -> Result<(), AuthError> {
    if claims.is_admin() || booking.is_guest(claims.id) || listing_host == Some(claims.id) {
        return Ok(());
    }
    deny(claims, "Not authorized to view this booking")
}

/// On whose authority a booking is being cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Canceller {
    /// The guest; only allowed while the booking is pending
    Guest,
    Admin,
}

pub fn cancel_right(claims: &Claims, booking: &Booking) -> Result<Canceller, AuthError> {
    if claims.is_admin() {
        return Ok(Canceller::Admin);
    }
    if booking.is_guest(claims.id) {
        return Ok(Canceller::Guest);
    }
    deny(claims, "Not authorized")
}

fn deny<T>(claims: &Claims, reason: &str) -> Result<T, AuthError> {
    debug!(user_id = %claims.id, role = %claims.role, reason, "authorization denied");
    Err(AuthError::Forbidden(reason.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use rental_core::booking::BookingStatus;
    use rental_core::user::{NewUser, UserRole};

    use super::*;

    fn claims(role: UserRole) -> Claims {
        Claims {
            id: Uuid::new_v4(),
            username: "caller".to_string(),
            email: "caller@example.com".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            profile_picture: String::new(),
            role,
            exp: 0,
        }
    }

    fn booking_by(guest: Uuid) -> Booking {
        let day = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        Booking {
            id: Uuid::new_v4(),
            property: Uuid::new_v4(),
            user: guest,
            start_date: day,
            end_date: day,
            guests: 1,
            total_price: 10.0,
            special_requests: String::new(),
            status: BookingStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn admin_only() {
        assert!(require_admin(&claims(UserRole::Admin)).is_ok());
        assert!(matches!(
            require_admin(&claims(UserRole::Host)),
            Err(AuthError::Forbidden(_))
        ));
    }

    #[test]
    fn owner_or_admin() {
        let owner = claims(UserRole::Host);
        assert!(require_owner_or_admin(&owner, owner.id).is_ok());
        assert!(require_owner_or_admin(&claims(UserRole::Host), owner.id).is_err());
        assert!(require_owner_or_admin(&claims(UserRole::Admin), owner.id).is_ok());
    }

    fn account(id: Uuid, username: &str) -> User {
        let mut user = NewUser::new(username, format!("{}@example.com", username), "$2b$04$hash")
            .into_user()
            .unwrap();
        user.id = id;
        user
    }

    #[test]
    fn self_or_admin() {
        let caller = claims(UserRole::User);
        assert!(require_self_or_admin(&caller, &account(caller.id, "caller")).is_ok());
        let other = account(Uuid::new_v4(), "someone-else");
        assert!(require_self_or_admin(&caller, &other).is_err());
        assert!(require_self_or_admin(&claims(UserRole::Admin), &other).is_ok());
    }

    #[test]
    fn same_username_with_new_id_is_not_self() {
        let caller = claims(UserRole::User);
        let successor = account(Uuid::new_v4(), "caller");
        assert!(matches!(
            require_self_or_admin(&caller, &successor),
            Err(AuthError::Forbidden(_))
        ));
    }

    #[test]
    fn booking_visibility() {
        let guest = claims(UserRole::User);
        let host = claims(UserRole::Host);
        let booking = booking_by(guest.id);
        assert!(require_booking_viewer(&guest, &booking, Some(host.id)).is_ok());
        assert!(require_booking_viewer(&host, &booking, Some(host.id)).is_ok());
        assert!(require_booking_viewer(&claims(UserRole::User), &booking, Some(host.id)).is_err());
    }

    #[test]
    fn cancellation_authority() {
        let guest = claims(UserRole::User);
        let booking = booking_by(guest.id);
        assert_eq!(cancel_right(&guest, &booking).unwrap(), Canceller::Guest);
        assert_eq!(
            cancel_right(&claims(UserRole::Admin), &booking).unwrap(),
            Canceller::Admin
        );
        assert!(cancel_right(&claims(UserRole::Host), &booking).is_err());
    }
}
