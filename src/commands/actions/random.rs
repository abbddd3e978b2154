//! Random number command handlers.
//!
//! Both commands draw at most [`MAX_RAND`] numbers per request and answer
//! with an English list, e.g. `4, 1, and 6`.

use log::debug;
use rand::Rng;

use crate::{commands::CommandResult, pagination::Document, utils::human_list};

/// Most numbers drawn by a single command.
pub const MAX_RAND: usize = 50;

/// Draws `times` integers between 1 and `limit`.
pub fn handle_random(limit: u64, times: usize) -> CommandResult {
    debug!("handling random command: limit {}, times {}", limit, times);

    if times > MAX_RAND {
        return too_much(times);
    }

    let values = draw_integers(&mut rand::thread_rng(), limit, times);
    CommandResult::reply(Document::new().body(human_list(&values)))
}

/// Draws `times` percentages with two decimals.
pub fn handle_percent(times: usize) -> CommandResult {
    debug!("handling percent command: times {}", times);

    if times > MAX_RAND {
        return too_much(times);
    }

    let values = draw_percentages(&mut rand::thread_rng(), times);
    CommandResult::reply(Document::new().body(human_list(&values)))
}

fn too_much(times: usize) -> CommandResult {
    CommandResult::reply(Document::new().body(format!(
        "_Chill._ I don't want to generate {} random numbers; that's a lot. {} is my limit.",
        times, MAX_RAND
    )))
}

fn draw_integers<R: Rng>(rng: &mut R, limit: u64, times: usize) -> Vec<String> {
    (0..times)
        .map(|_| rng.gen_range(1..=limit).to_string())
        .collect()
}

fn draw_percentages<R: Rng>(rng: &mut R, times: usize) -> Vec<String> {
    // Inclusive so that 100% can come out
    (0..times)
        .map(|_| format!("{:.2}%", rng.gen_range(0.0..=100.0)))
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_draw_integers_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let values = draw_integers(&mut rng, 6, MAX_RAND);

        assert_eq!(values.len(), MAX_RAND);
        for value in values {
            let value: u64 = value.parse().unwrap();
            assert!((1..=6).contains(&value));
        }
    }

    #[test]
    fn test_draw_integers_with_limit_one() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(draw_integers(&mut rng, 1, 3), vec!["1", "1", "1"]);
    }

    #[test]
    fn test_draw_percentages_format() {
        let mut rng = StdRng::seed_from_u64(7);
        for value in draw_percentages(&mut rng, 20) {
            let number = value.strip_suffix('%').unwrap();
            let (_, decimals) = number.split_once('.').unwrap();
            assert_eq!(decimals.len(), 2);
            let number: f64 = number.parse().unwrap();
            assert!((0.0..=100.0).contains(&number));
        }
    }

    #[test]
    fn test_handle_random_single_value() {
        let result = handle_random(1, 1);
        assert_eq!(result.response.unwrap().body, "1");
    }

    #[test]
    fn test_handle_random_list() {
        let result = handle_random(1, 3);
        assert_eq!(result.response.unwrap().body, "1, 1, and 1");
    }

    #[test]
    fn test_handle_random_refuses_too_many() {
        let result = handle_random(10, MAX_RAND + 1);
        let body = result.response.unwrap().body;
        assert!(body.starts_with("_Chill._"));
        assert!(body.contains("51 random numbers"));
    }

    #[test]
    fn test_handle_percent_refuses_too_many() {
        let result = handle_percent(100);
        assert!(result.response.unwrap().body.contains("50 is my limit"));
    }
}
