//! Arithmetic captcha for the public registration form.

use dashmap::DashMap;
use rand::Rng;
use serde::Serialize;
use service_core::error::AppError;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Challenge handed to the registration form.
#[derive(Debug, Clone, Serialize)]
pub struct CaptchaChallenge {
    pub captcha_id: Uuid,
    pub question: String,
    pub expires_in_seconds: u64,
}

struct PendingChallenge {
    answer: u32,
    issued_at: Instant,
}

/// In-memory challenge store. Each challenge can be answered once.
pub struct CaptchaStore {
    challenges: DashMap<Uuid, PendingChallenge>,
    ttl: Duration,
}

impl CaptchaStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            challenges: DashMap::new(),
            ttl,
        }
    }

    pub fn issue(&self) -> CaptchaChallenge {
        let mut rng = rand::thread_rng();
        let a: u32 = rng.gen_range(1..=9);
        let b: u32 = rng.gen_range(1..=9);
        self.issue_with(a, b)
    }

    pub(crate) fn issue_with(&self, a: u32, b: u32) -> CaptchaChallenge {
        self.purge_expired();

        let captcha_id = Uuid::new_v4();
        self.challenges.insert(
            captcha_id,
            PendingChallenge {
                answer: a + b,
                issued_at: Instant::now(),
            },
        );

        CaptchaChallenge {
            captcha_id,
            question: format!("What is {} + {}?", a, b),
            expires_in_seconds: self.ttl.as_secs(),
        }
    }

    /// Check an answer. The challenge is consumed whatever the outcome.
    pub fn verify(&self, captcha_id: Uuid, answer: &str) -> Result<(), AppError> {
        let (_, pending) = self.challenges.remove(&captcha_id).ok_or_else(|| {
            AppError::field_invalid(
                "captcha_id",
                "captcha_unknown",
                "Captcha expired or already used",
            )
        })?;

        if pending.issued_at.elapsed() > self.ttl {
            return Err(AppError::field_invalid(
                "captcha_id",
                "captcha_expired",
                "Captcha expired or already used",
            ));
        }

        match answer.trim().parse::<u32>() {
            Ok(value) if value == pending.answer => Ok(()),
            _ => Err(AppError::field_invalid(
                "captcha_answer",
                "captcha_mismatch",
                "Captcha answer is incorrect",
            )),
        }
    }

    fn purge_expired(&self) {
        let ttl = self.ttl;
        self.challenges
            .retain(|_, pending| pending.issued_at.elapsed() <= ttl);
    }

    pub fn pending(&self) -> usize {
        self.challenges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_answer_is_accepted_once() {
        let store = CaptchaStore::new(Duration::from_secs(60));
        let challenge = store.issue_with(3, 4);

        assert_eq!(challenge.question, "What is 3 + 4?");
        assert!(store.verify(challenge.captcha_id, " 7 ").is_ok());
        assert!(store.verify(challenge.captcha_id, "7").is_err());
    }

    #[test]
    fn wrong_answer_consumes_challenge() {
        let store = CaptchaStore::new(Duration::from_secs(60));
        let challenge = store.issue_with(2, 2);

        let err = store.verify(challenge.captcha_id, "5").unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(store.pending(), 0);
    }

    #[test]
    fn expired_challenge_is_rejected() {
        let store = CaptchaStore::new(Duration::ZERO);
        let challenge = store.issue_with(1, 1);
        std::thread::sleep(Duration::from_millis(5));

        assert!(store.verify(challenge.captcha_id, "2").is_err());
    }

    #[test]
    fn random_challenge_has_single_digit_operands() {
        let store = CaptchaStore::new(Duration::from_secs(60));
        let challenge = store.issue();
        assert!(challenge.question.starts_with("What is "));
        assert_eq!(store.pending(), 1);
    }
}
