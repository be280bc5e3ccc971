//! TranspositionBruteForcer: search over grid widths, direction chains and
//! column orders.
//!
//! Search bound: widths from `min_width` to `max_width` (capped at the
//! message length) in ascending order, and for each width every direction
//! chain of length `1..=max_chain` from [`direction_chains`]: 5, 19 and 69
//! chains per width for `max_chain` 1, 2 and 3, growing about fourfold with
//! every extra step. These fixed-order reconstructions read the columns left
//! to right.
//!
//! Keyed columns: a width whose fixed-order reconstructions are not
//! confident also gets a randomized search over column orders for the
//! single column traversals (`TB`, `BT`). Each of `column_restarts` restarts
//! anneals from a random order for `column_iterations` moves: swap two
//! columns, move one, or shift all column labels by one step. Restarts draw
//! from their own seeded RNG and run in parallel.
//!
//! Early termination: the search stops when `max_candidates`
//! reconstructions have been scored (a column-order restart counts as one),
//! when the deadline expires, or after the first width whose best
//! reconstruction reaches `stop_confidence`.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, debug_span, trace};

use super::config::TranspositionConfig;
use super::reference::ENGLISH;
use super::search::{keep_best, run_with_workers, Deadline};
use crate::error::Result;
use crate::key::{Direction, TranspositionKey};
use crate::transposition_codec::decode_symbols;
use crate::utils::converter::{folded_letter_index, folded_letter_indices};

/// Traversals whose column order is searched.
const KEYED_DIRECTIONS: [Direction; 2] = [Direction::TopBottom, Direction::BottomTop];

/// Moves between two deadline checks.
const DEADLINE_STRIDE: usize = 64;

/// One reconstruction of the plaintext.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranspositionCandidate {
    pub width: usize,
    /// Order in which the column traversals read the columns.
    pub column_order: Vec<usize>,
    /// Encryption chain, in application order.
    pub directions: Vec<Direction>,
    pub plaintext: String,
    pub fitness: f64,
    pub confidence: f64,
}

impl TranspositionCandidate {
    /// The key this candidate stands for.
    ///
    /// # Errors
    /// Never fails for a candidate returned by [`brute_force_transposition`].
    pub fn transposition_key(&self) -> Result<TranspositionKey> {
        TranspositionKey::new(self.width, self.directions.clone())?
            .with_column_order(self.column_order.clone())
    }
}

/// Every direction chain of length `1..=max_chain`, shortest first.
///
/// Single directions are all listed. Longer chains leave out `LR`, which
/// reads the grid in its own order, and a repeated `RL` or `ZZ`, which
/// undoes itself, since such chains only repeat shorter ones.
pub fn direction_chains(max_chain: usize) -> Vec<Vec<Direction>> {
    let steps: Vec<Direction> = Direction::ALL
        .iter()
        .copied()
        .filter(|&d| d != Direction::LeftRight)
        .collect();
    let mut chains: Vec<Vec<Direction>> = Direction::ALL.iter().map(|&d| vec![d]).collect();
    let mut frontier: Vec<Vec<Direction>> = steps.iter().map(|&d| vec![d]).collect();
    for _ in 1..max_chain {
        frontier = frontier
            .iter()
            .flat_map(|chain| {
                steps.iter().filter_map(move |&next| {
                    let last = chain[chain.len() - 1];
                    let involution = matches!(next, Direction::RightLeft | Direction::ZigZag);
                    if involution && last == next {
                        return None;
                    }
                    let mut longer = chain.clone();
                    longer.push(next);
                    Some(longer)
                })
            })
            .collect();
        chains.extend(frontier.iter().cloned());
    }
    chains
}

/// Searches widths `config.min_width..=max_width`, direction chains and
/// column orders for the most English-like reconstruction of `ciphertext`.
///
/// Every character, letter or not, takes part in the permutation; letters
/// of either case are scored. Returns an empty list for an empty
/// ciphertext.
pub fn brute_force_transposition(
    ciphertext: &str,
    max_width: usize,
    config: &TranspositionConfig,
) -> Vec<TranspositionCandidate> {
    let symbols: Vec<char> = ciphertext.chars().collect();
    if symbols.is_empty() {
        return Vec::new();
    }
    let span = debug_span!("brute_force_transposition", len = symbols.len(), max_width);
    let _enter = span.enter();

    let chains = direction_chains(config.max_chain.max(1));
    let codes: Vec<Option<usize>> = symbols.iter().map(|&c| folded_letter_index(c)).collect();
    let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let deadline = Deadline::from_millis(config.deadline_ms);
    let confident = |best: f64| config.stop_confidence.is_some_and(|threshold| best >= threshold);
    let mut budget = config.max_candidates;
    let mut candidates: Vec<TranspositionCandidate> = Vec::new();

    for width in config.min_width.max(1)..=max_width.min(symbols.len()) {
        if budget == 0 || deadline.expired() {
            debug!(width, budget, "transposition search stopped");
            break;
        }
        let batch = &chains[..chains.len().min(budget)];
        budget -= batch.len();
        let natural: Vec<usize> = (0..width).collect();

        let scored: Vec<TranspositionCandidate> = run_with_workers(config.workers, || {
            batch
                .par_iter()
                .filter_map(|chain| reconstruct(&symbols, width, &natural, chain))
                .collect()
        });
        let mut best = scored.iter().map(|c| c.confidence).fold(0.0, f64::max);
        debug!(width, scored = scored.len(), best, "width searched");
        candidates.extend(scored);

        if !confident(best) && width >= 2 && budget > 0 {
            let keyed =
                search_column_orders(&symbols, &codes, width, budget, config, seed, deadline);
            budget -= keyed.len();
            let keyed_best = keyed.iter().map(|c| c.confidence).fold(0.0, f64::max);
            debug!(width, keyed_best, "column orders searched");
            best = best.max(keyed_best);
            candidates.extend(keyed);
        }

        if confident(best) {
            debug!(width, best, "confident reconstruction found");
            break;
        }
    }

    candidates.sort_by(|a, b| {
        b.fitness
            .total_cmp(&a.fitness)
            .then(a.width.cmp(&b.width))
            .then(a.directions.len().cmp(&b.directions.len()))
    });
    keep_best(candidates, config.top_k.max(1), |c| c.plaintext.clone())
}

fn reconstruct(
    symbols: &[char],
    width: usize,
    columns: &[usize],
    chain: &[Direction],
) -> Option<TranspositionCandidate> {
    let plaintext: String = decode_symbols(symbols, width, columns, chain)
        .ok()?
        .into_iter()
        .collect();
    let fitness = ENGLISH.fitness(&folded_letter_indices(&plaintext));
    trace!(width, ?columns, ?chain, fitness, "reconstruction scored");
    Some(TranspositionCandidate {
        width,
        column_order: columns.to_vec(),
        directions: chain.to_vec(),
        plaintext,
        fitness,
        confidence: ENGLISH.confidence(fitness),
    })
}

/// Runs up to `limit` column-order restarts of one width; returns the best
/// reconstruction of each.
fn search_column_orders(
    symbols: &[char],
    codes: &[Option<usize>],
    width: usize,
    limit: usize,
    config: &TranspositionConfig,
    seed: u64,
    deadline: Deadline,
) -> Vec<TranspositionCandidate> {
    let tasks: Vec<(usize, Direction, usize)> = KEYED_DIRECTIONS
        .iter()
        .enumerate()
        .flat_map(|(slot, &direction)| {
            (0..config.column_restarts).map(move |restart| (slot, direction, restart))
        })
        .take(limit)
        .collect();

    let orders: Vec<(Direction, Vec<usize>)> = run_with_workers(config.workers, || {
        tasks
            .par_iter()
            .map(|&(slot, direction, restart)| {
                let stream = ((width as u64) << 32) | ((slot as u64) << 16) | restart as u64;
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(stream));
                let (order, fitness) =
                    anneal_columns(codes, width, direction, config, deadline, &mut rng);
                debug!(width, %direction, restart, fitness, "column restart finished");
                (direction, order)
            })
            .collect()
    });
    orders
        .into_iter()
        .filter_map(|(direction, order)| reconstruct(symbols, width, &order, &[direction]))
        .collect()
}

/// One annealing restart over the column order of a single traversal.
fn anneal_columns(
    codes: &[Option<usize>],
    width: usize,
    direction: Direction,
    config: &TranspositionConfig,
    deadline: Deadline,
    rng: &mut StdRng,
) -> (Vec<usize>, f64) {
    let chain = [direction];
    let score = |columns: &[usize]| {
        let letters: Vec<usize> = decode_symbols(codes, width, columns, &chain)
            .map(|decoded| decoded.into_iter().flatten().collect())
            .unwrap_or_default();
        ENGLISH.fitness(&letters)
    };

    let mut current: Vec<usize> = (0..width).collect();
    current.shuffle(rng);
    let mut current_score = score(&current);
    let (mut best, mut best_score) = (current.clone(), current_score);

    for iteration in 0..config.column_iterations {
        if iteration % DEADLINE_STRIDE == 0 && deadline.expired() {
            debug!(width, iteration, "column restart hit the deadline");
            break;
        }
        let next = perturb(&current, rng);
        let next_score = score(&next);
        let delta = next_score - current_score;
        let progress = iteration as f64 / config.column_iterations as f64;
        let temperature = config.column_temperature * (1.0 - progress);
        let accept = delta >= 0.0
            || (temperature > 0.0 && rng.gen::<f64>() < (delta / temperature).exp());
        if accept {
            current = next;
            current_score = next_score;
            if current_score > best_score {
                best.clone_from(&current);
                best_score = current_score;
                trace!(width, iteration, fitness = best_score, "new best column order");
            }
        }
    }
    (best, best_score)
}

/// Swaps two columns, moves one column to another place, or shifts every
/// column label by the same step.
fn perturb(columns: &[usize], rng: &mut StdRng) -> Vec<usize> {
    let width = columns.len();
    let i = rng.gen_range(0..width);
    let step = rng.gen_range(1..width);
    let j = (i + step) % width;
    let mut next = columns.to_vec();
    match rng.gen_range(0..3) {
        0 => next.swap(i, j),
        1 => {
            let column = next.remove(i);
            next.insert(j, column);
        }
        _ => next.iter_mut().for_each(|column| *column = (*column + step) % width),
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transposition_codec;

    const MESSAGE: &str = "the lighthouse keeper wrote every evening in a small book about the \
        ships that passed the rocks and the birds that rested on the rail";

    fn encrypt(width: usize, directions: &[Direction]) -> String {
        let key = TranspositionKey::new(width, directions.to_vec()).unwrap();
        transposition_codec::encode(MESSAGE, &key).unwrap()
    }

    fn encrypt_keyed(order: &[usize]) -> String {
        let key = TranspositionKey::new(order.len(), vec![Direction::TopBottom])
            .unwrap()
            .with_column_order(order.to_vec())
            .unwrap();
        transposition_codec::encode(MESSAGE, &key).unwrap()
    }

    fn keyed_config(seed: u64) -> TranspositionConfig {
        TranspositionConfig {
            min_width: 5,
            column_restarts: 6,
            seed: Some(seed),
            ..TranspositionConfig::default()
        }
    }

    #[test]
    fn test_direction_chains() {
        let chains = direction_chains(2);
        assert_eq!(chains.len(), 5 + 14);
        assert!(chains.contains(&vec![Direction::TopBottom, Direction::ZigZag]));
        assert!(!chains.contains(&vec![Direction::RightLeft, Direction::RightLeft]));
        assert!(!chains.contains(&vec![Direction::LeftRight, Direction::TopBottom]));
        assert_eq!(direction_chains(1).len(), 5);
        assert_eq!(direction_chains(3).len(), 5 + 14 + 50);
    }

    #[test]
    fn test_recovers_columnar_transposition() {
        let ciphertext = encrypt(7, &[Direction::TopBottom]);
        let candidates =
            brute_force_transposition(&ciphertext, 10, &TranspositionConfig::default());
        let best = &candidates[0];
        assert_eq!(best.plaintext, MESSAGE);
        assert_eq!(best.width, 7);
        assert!(best.confidence >= 0.85);
        let key = best.transposition_key().unwrap();
        assert_eq!(transposition_codec::encode(&best.plaintext, &key).unwrap(), ciphertext);
    }

    #[test]
    fn test_recovers_keyed_columnar_order() {
        let ciphertext = encrypt_keyed(&[3, 0, 4, 1, 2]);
        let candidates = brute_force_transposition(&ciphertext, 5, &keyed_config(7));
        let best = &candidates[0];
        assert_eq!(best.plaintext, MESSAGE);
        assert_eq!(best.width, 5);
        assert_eq!(best.column_order, vec![3, 0, 4, 1, 2]);
        assert_eq!(best.directions, vec![Direction::TopBottom]);
        let key = best.transposition_key().unwrap();
        assert!(key.is_keyed());
        assert_eq!(transposition_codec::encode(&best.plaintext, &key).unwrap(), ciphertext);
    }

    #[test]
    fn test_column_search_is_reproducible() {
        let ciphertext = encrypt_keyed(&[4, 2, 0, 3, 1]);
        let a = brute_force_transposition(&ciphertext, 5, &keyed_config(3));
        let b = brute_force_transposition(&ciphertext, 5, &keyed_config(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_column_restarts_keeps_natural_order() {
        let ciphertext = encrypt_keyed(&[3, 0, 4, 1, 2]);
        let config = TranspositionConfig {
            column_restarts: 0,
            stop_confidence: None,
            top_k: 100,
            ..keyed_config(1)
        };
        let candidates = brute_force_transposition(&ciphertext, 6, &config);
        assert!(!candidates.is_empty());
        for candidate in &candidates {
            let natural: Vec<usize> = (0..candidate.width).collect();
            assert_eq!(candidate.column_order, natural);
            assert_ne!(candidate.plaintext, MESSAGE);
        }
    }

    #[test]
    fn test_perturb_keeps_a_permutation() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut columns: Vec<usize> = (0..7).collect();
        for _ in 0..200 {
            columns = perturb(&columns, &mut rng);
            let mut sorted = columns.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, (0..7).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_budget_limits_search() {
        let ciphertext = encrypt(9, &[Direction::BottomTop]);
        let config = TranspositionConfig {
            max_candidates: 19,
            stop_confidence: None,
            top_k: 100,
            ..TranspositionConfig::default()
        };
        let candidates = brute_force_transposition(&ciphertext, 12, &config);
        assert!(candidates.iter().all(|c| c.width == 1));
    }

    #[test]
    fn test_empty_ciphertext() {
        assert!(brute_force_transposition("", 5, &TranspositionConfig::default()).is_empty());
    }

    #[test]
    fn test_width_capped_at_length() {
        let config = TranspositionConfig {
            stop_confidence: None,
            top_k: 100,
            ..TranspositionConfig::default()
        };
        let candidates = brute_force_transposition("abc", 50, &config);
        assert!(candidates.iter().all(|c| c.width <= 3));
        assert!(candidates.iter().any(|c| c.plaintext == "cba"));
    }
}
