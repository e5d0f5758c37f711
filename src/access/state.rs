use rand::Rng;
use serde::Serialize;

/// Tokens are a fixed prefix plus a short random suffix; uniqueness is not
/// guaranteed and collisions are accepted.
pub const TOKEN_PREFIX: &str = "HC-PRO-TEMP-TOKEN-";
pub const ROTATION_SECONDS: u32 = 60;

const TOKEN_SUFFIX_LEN: usize = 9;
const TOKEN_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Countdown state for the recycling-station digital key. `seconds_remaining`
/// stays in `[1, 60]` while active; the wrap from 1 regenerates the token and
/// resets the counter in the same mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenState {
    pub token: String,
    pub seconds_remaining: u32,
    pub active: bool,
}

impl Default for AccessTokenState {
    fn default() -> Self {
        Self {
            token: String::new(),
            seconds_remaining: ROTATION_SECONDS,
            active: false,
        }
    }
}

impl AccessTokenState {
    pub fn idle() -> Self {
        Self::default()
    }

    /// Fresh token and a full countdown. Nothing carries over between visits
    /// to the access view.
    pub fn activate(&mut self) {
        self.token = generate_token();
        self.seconds_remaining = ROTATION_SECONDS;
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        *self = Self::default();
    }

    /// Advances the countdown by one second. Returns true when the countdown
    /// wrapped and the token regenerated.
    pub fn tick(&mut self) -> bool {
        if !self.active {
            return false;
        }

        if self.seconds_remaining <= 1 {
            self.token = generate_token();
            self.seconds_remaining = ROTATION_SECONDS;
            true
        } else {
            self.seconds_remaining -= 1;
            false
        }
    }
}

pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..TOKEN_SUFFIX_LEN)
        .map(|_| TOKEN_CHARSET[rng.gen_range(0..TOKEN_CHARSET.len())] as char)
        .collect();
    format!("{TOKEN_PREFIX}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_carry_prefix_and_suffix() {
        let token = generate_token();
        assert!(token.starts_with(TOKEN_PREFIX));
        assert_eq!(token.len(), TOKEN_PREFIX.len() + TOKEN_SUFFIX_LEN);
        assert!(token[TOKEN_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn activation_starts_a_full_countdown() {
        let mut state = AccessTokenState::idle();
        state.activate();

        assert!(state.active);
        assert_eq!(state.seconds_remaining, ROTATION_SECONDS);
        assert!(state.token.starts_with(TOKEN_PREFIX));
    }

    #[test]
    fn counts_down_without_rotating_until_the_wrap() {
        let mut state = AccessTokenState::idle();
        state.activate();
        let first_token = state.token.clone();

        for _ in 0..59 {
            assert!(!state.tick());
        }

        assert_eq!(state.seconds_remaining, 1);
        assert_eq!(state.token, first_token);
    }

    #[test]
    fn sixty_ticks_rotate_exactly_once_and_reset() {
        let mut state = AccessTokenState::idle();
        state.activate();
        let first_token = state.token.clone();

        let rotations = (0..60).filter(|_| state.tick()).count();

        assert_eq!(rotations, 1);
        assert_eq!(state.seconds_remaining, ROTATION_SECONDS);
        assert_ne!(state.token, first_token);
    }

    #[test]
    fn inactive_state_ignores_ticks() {
        let mut state = AccessTokenState::idle();
        state.activate();
        state.deactivate();

        for _ in 0..120 {
            assert!(!state.tick());
        }
        assert!(!state.active);
        assert!(state.token.is_empty());
    }

    #[test]
    fn reactivation_never_carries_state_over() {
        let mut state = AccessTokenState::idle();
        state.activate();
        for _ in 0..37 {
            state.tick();
        }
        state.deactivate();

        state.activate();
        assert_eq!(state.seconds_remaining, ROTATION_SECONDS);
    }
}
