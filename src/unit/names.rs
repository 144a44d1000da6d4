//! Unique display names per side

use ahash::AHashSet;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::config::NamesConfig;
use crate::core::types::Side;

#[derive(Debug, Clone)]
struct NamePool {
    names: Vec<String>,
    used: AHashSet<String>,
    overflow: u32,
}

impl NamePool {
    fn new(names: &[String]) -> Self {
        Self {
            names: names.to_vec(),
            used: AHashSet::new(),
            overflow: 0,
        }
    }
}

/// Hands out names that are unique within a side
///
/// Picks an unused base name at random. Once every base name is taken it
/// appends a counter ("Kael 2", "Kael 3", ...).
#[derive(Debug, Clone)]
pub struct NameGenerator {
    player: NamePool,
    enemy: NamePool,
}

impl NameGenerator {
    pub fn new(config: &NamesConfig) -> Self {
        Self {
            player: NamePool::new(config.for_side(Side::Player)),
            enemy: NamePool::new(config.for_side(Side::Enemy)),
        }
    }

    fn pool_mut(&mut self, side: Side) -> &mut NamePool {
        match side {
            Side::Player => &mut self.player,
            Side::Enemy => &mut self.enemy,
        }
    }

    pub fn unique_name<R: Rng + ?Sized>(&mut self, side: Side, rng: &mut R) -> String {
        let pool = self.pool_mut(side);

        let picked = {
            let free: Vec<&String> = pool.names.iter().filter(|n| !pool.used.contains(*n)).collect();
            free.choose(rng).map(|n| (*n).clone())
        };
        if let Some(name) = picked {
            pool.used.insert(name.clone());
            return name;
        }

        let base = pool
            .names
            .choose(rng)
            .cloned()
            .unwrap_or_else(|| side.name().to_string());
        loop {
            pool.overflow += 1;
            let candidate = format!("{} {}", base, pool.overflow + 1);
            if pool.used.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Return a name to the pool
    pub fn release(&mut self, side: Side, name: &str) -> bool {
        self.pool_mut(side).used.remove(name)
    }

    /// Forget every issued name
    pub fn reset(&mut self) {
        for side in Side::ALL {
            let pool = self.pool_mut(side);
            pool.used.clear();
            pool.overflow = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn small_config() -> NamesConfig {
        NamesConfig {
            player: vec!["Ada".into(), "Bo".into()],
            enemy: vec![],
        }
    }

    #[test]
    fn test_names_unique_past_pool_size() {
        let mut names = NameGenerator::new(&small_config());
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let issued: Vec<String> = (0..6).map(|_| names.unique_name(Side::Player, &mut rng)).collect();
        let distinct: AHashSet<&String> = issued.iter().collect();
        assert_eq!(distinct.len(), 6);
        assert!(issued[..2].iter().all(|n| n == "Ada" || n == "Bo"));
        assert!(issued[2..].iter().all(|n| n.contains(' ')));
    }

    #[test]
    fn test_empty_pool_falls_back_to_side_name() {
        let mut names = NameGenerator::new(&small_config());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(names.unique_name(Side::Enemy, &mut rng), "Enemy 2");
        assert_eq!(names.unique_name(Side::Enemy, &mut rng), "Enemy 3");
    }

    #[test]
    fn test_release_and_reset_free_names() {
        let mut names = NameGenerator::new(&small_config());
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let first = names.unique_name(Side::Player, &mut rng);
        assert!(names.release(Side::Player, &first));
        assert!(!names.release(Side::Player, &first));

        names.unique_name(Side::Player, &mut rng);
        names.unique_name(Side::Player, &mut rng);
        names.reset();
        let again = names.unique_name(Side::Player, &mut rng);
        assert!(again == "Ada" || again == "Bo");
    }
}
