//! Defines functions for storing the backend session in private cookies.
//!
//! The backend hands out an access token, a refresh token and the user's ID
//! on log-in. All three are stored in encrypted cookies so the browser never
//! sees the raw tokens.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::Error;

pub(crate) const COOKIE_ACCESS_TOKEN: &str = "access_token";
pub(crate) const COOKIE_REFRESH_TOKEN: &str = "refresh_token";
pub(crate) const COOKIE_USER_ID: &str = "user_id";

/// The default duration for which session cookies are valid.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(30);

/// The backend session for a logged-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The bearer token sent to the backend on every request.
    pub access_token: String,
    /// The token the backend accepts for renewing an expired access token.
    pub refresh_token: String,
    /// The ID the backend assigned to the user.
    pub user_id: i64,
}

fn build_session_cookie(name: &'static str, value: String, expiry: OffsetDateTime) -> Cookie<'_> {
    Cookie::build((name, value))
        .expires(expiry)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .path("/")
        .build()
}

/// Add the session cookies to the cookie jar, indicating that a user is
/// logged in and authenticated.
///
/// Sets the expiry of the cookies to `duration` from the current time. Use
/// [DEFAULT_COOKIE_DURATION] for the default duration.
///
/// Returns the cookie jar with the cookies added.
pub fn set_session_cookies(
    jar: PrivateCookieJar,
    session: Session,
    duration: Duration,
) -> PrivateCookieJar {
    let expiry = OffsetDateTime::now_utc() + duration;

    jar.add(build_session_cookie(
        COOKIE_ACCESS_TOKEN,
        session.access_token,
        expiry,
    ))
    .add(build_session_cookie(
        COOKIE_REFRESH_TOKEN,
        session.refresh_token,
        expiry,
    ))
    .add(build_session_cookie(
        COOKIE_USER_ID,
        session.user_id.to_string(),
        expiry,
    ))
}

/// Set the session cookies to an invalid value and set their max age to zero,
/// which should delete the cookies on the client side.
pub fn invalidate_session_cookies(jar: PrivateCookieJar) -> PrivateCookieJar {
    [COOKIE_ACCESS_TOKEN, COOKIE_REFRESH_TOKEN, COOKIE_USER_ID]
        .into_iter()
        .fold(jar, |jar, name| {
            jar.add(
                Cookie::build((name, "deleted"))
                    .expires(OffsetDateTime::UNIX_EPOCH)
                    .max_age(Duration::ZERO)
                    .http_only(true)
                    .same_site(SameSite::Strict)
                    .secure(true)
                    .path("/"),
            )
        })
}

/// Read the session back out of the cookie jar.
///
/// # Errors
///
/// Returns [Error::CookieMissing] if any of the session cookies are absent or
/// the user ID cookie does not hold an integer.
pub fn get_session_from_cookies(jar: &PrivateCookieJar) -> Result<Session, Error> {
    let access_token = jar
        .get(COOKIE_ACCESS_TOKEN)
        .ok_or(Error::CookieMissing)?
        .value_trimmed()
        .to_owned();
    let refresh_token = jar
        .get(COOKIE_REFRESH_TOKEN)
        .ok_or(Error::CookieMissing)?
        .value_trimmed()
        .to_owned();
    let user_id = jar
        .get(COOKIE_USER_ID)
        .ok_or(Error::CookieMissing)?
        .value_trimmed()
        .parse::<i64>()
        .map_err(|_| Error::CookieMissing)?;

    Ok(Session {
        access_token,
        refresh_token,
        user_id,
    })
}

#[cfg(test)]
mod cookie_tests {
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        auth::cookie::{COOKIE_ACCESS_TOKEN, COOKIE_USER_ID, DEFAULT_COOKIE_DURATION},
    };

    use super::{
        Session, get_session_from_cookies, invalidate_session_cookies, set_session_cookies,
    };

    fn get_jar() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");
        let key = Key::from(&hash);

        PrivateCookieJar::new(key)
    }

    fn test_session() -> Session {
        Session {
            access_token: "access-token-abc".to_owned(),
            refresh_token: "refresh-token-def".to_owned(),
            user_id: 42,
        }
    }

    /// Test helper macro to assert that two date times are within one second
    /// of each other. Used instead of a function so that the file and line
    /// number of the caller is included in the error message instead of the
    /// helper.
    macro_rules! assert_date_time_close {
        ($left:expr, $right:expr) => {
            assert!(
                ($left - $right).abs() < Duration::seconds(1),
                "got date time {:?}, want {:?}",
                $left,
                $right
            );
        };
    }

    #[test]
    fn can_round_trip_session() {
        let jar = set_session_cookies(get_jar(), test_session(), DEFAULT_COOKIE_DURATION);

        let got = get_session_from_cookies(&jar).unwrap();

        assert_eq!(got, test_session());
    }

    #[test]
    fn cookies_are_scoped_and_expire() {
        let jar = set_session_cookies(get_jar(), test_session(), DEFAULT_COOKIE_DURATION);

        let cookie = jar.get(COOKIE_ACCESS_TOKEN).unwrap();

        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_date_time_close!(
            cookie.expires_datetime().unwrap(),
            OffsetDateTime::now_utc() + DEFAULT_COOKIE_DURATION
        );
    }

    #[test]
    fn missing_cookie_is_an_error() {
        let jar = get_jar();

        assert_eq!(get_session_from_cookies(&jar), Err(Error::CookieMissing));
    }

    #[test]
    fn invalidate_session_cookies_succeeds() {
        let jar = set_session_cookies(get_jar(), test_session(), DEFAULT_COOKIE_DURATION);

        let jar = invalidate_session_cookies(jar);
        let cookie = jar.get(COOKIE_USER_ID).unwrap();

        assert_eq!(cookie.value(), "deleted");
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(get_session_from_cookies(&jar), Err(Error::CookieMissing));
    }
}
