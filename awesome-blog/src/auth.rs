//! Password hashing and the signed session cookie.
//!
//! Cookie value: `uid-expires-sha1("uid-passwd-expires-secret")`.

use awesome_orm::{Model, Pool};
use md5::Md5;
use sha1::{Digest, Sha1};

use crate::models::User;

fn sha1_hex(s: &str) -> String {
    hex::encode(Sha1::digest(s.as_bytes()))
}

fn signature(uid: &str, passwd: &str, expires: &str, secret: &str) -> String {
    sha1_hex(&format!("{}-{}-{}-{}", uid, passwd, expires, secret))
}

/// Stored hash of the client side `sha1(email:password)`
pub fn hash_password(uid: &str, client_sha1: &str) -> String {
    sha1_hex(&format!("{}:{}", uid, client_sha1))
}

pub fn gravatar(email: &str) -> String {
    format!(
        "http://www.gravatar.com/avatar/{}?d=mm&s=120",
        hex::encode(Md5::digest(email.as_bytes()))
    )
}

/// Cookie value valid for `max_age` seconds from now
pub fn user2cookie(user: &User, max_age: i64, secret: &str) -> String {
    let expires = (chrono::Utc::now().timestamp() + max_age).to_string();
    let sig = signature(user.id(), &user.passwd, &expires, secret);

    [user.id(), expires.as_str(), sig.as_str()].join("-")
}

/// Signed in user of a cookie, with the password masked.
///
/// Any failure means nobody is signed in.
pub async fn cookie2user(pool: &Pool, cookie: &str, secret: &str) -> Option<User> {
    if cookie.is_empty() {
        return None;
    }

    let parts = cookie.split('-').collect::<Vec<_>>();
    let (uid, expires, sig) = match parts.as_slice() {
        [uid, expires, sig] => (*uid, *expires, *sig),
        _ => return None,
    };

    match expires.parse::<i64>() {
        Ok(t) if t >= chrono::Utc::now().timestamp() => {}
        Ok(_) => return None,
        Err(e) => {
            log::warn!("invalid cookie expiry {:?}: {}", expires, e);
            return None;
        }
    }

    let user = match User::find(pool, uid).await {
        Ok(Some(user)) => user,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("load cookie user {} failed: {}", uid, e);
            return None;
        }
    };

    if sig != signature(uid, &user.passwd, expires, secret) {
        log::info!("invalid sha1");
        return None;
    }

    Some(user.masked())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digests() {
        assert_eq!(sha1_hex("abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(
            gravatar("a@b.com"),
            format!(
                "http://www.gravatar.com/avatar/{}?d=mm&s=120",
                hex::encode(Md5::digest(b"a@b.com"))
            )
        );
        assert_eq!(hash_password("1", "x"), sha1_hex("1:x"));
    }

    #[test]
    fn cookie_layout() {
        let user = User {
            id: Some("0015".into()),
            passwd: "hash".into(),
            ..Default::default()
        };
        let cookie = user2cookie(&user, 60, "secret");

        let parts = cookie.split('-').collect::<Vec<_>>();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "0015");
        assert_eq!(parts[2], signature("0015", "hash", parts[1], "secret"));
    }
}
