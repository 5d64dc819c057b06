//! Per-render assignee color allocation
//!
//! Each assignee gets one pastel color (every channel in 128..=255) the first
//! time it is seen. The allocator is an ordinary value owned by whoever drives
//! a render, so two renders never share color state.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use waterfall_core::Rgb;

/// Attempts at drawing a color not already taken in this allocator
const MAX_DRAWS: usize = 8;

#[derive(Clone, Debug)]
pub struct ColorAllocator {
    colors: Vec<(String, Rgb)>,
    rng: StdRng,
}

impl Default for ColorAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorAllocator {
    /// Allocator drawing from an entropy-seeded palette
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic allocator, mainly for tests and reproducible output
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            colors: Vec::new(),
            rng,
        }
    }

    /// Color for `assignee`, allocating a new one on first sight
    pub fn color_for(&mut self, assignee: &str) -> Rgb {
        if let Some(color) = self.get(assignee) {
            return color;
        }
        let mut color = random_pastel(&mut self.rng);
        for _ in 1..MAX_DRAWS {
            if !self.colors.iter().any(|(_, c)| *c == color) {
                break;
            }
            color = random_pastel(&mut self.rng);
        }
        self.colors.push((assignee.to_string(), color));
        color
    }

    pub fn get(&self, assignee: &str) -> Option<Rgb> {
        self.colors
            .iter()
            .find(|(name, _)| name == assignee)
            .map(|(_, c)| *c)
    }

    /// Allocations in first-seen order
    pub fn entries(&self) -> impl Iterator<Item = (&str, Rgb)> {
        self.colors.iter().map(|(name, c)| (name.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Forget every allocation; the palette keeps advancing
    pub fn reset(&mut self) {
        self.colors.clear();
    }
}

fn random_pastel<R: Rng>(rng: &mut R) -> Rgb {
    let mut channel = || 128 + rng.gen_range(0..=127u8);
    Rgb::new(channel(), channel(), channel())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_pastel(c: Rgb) -> bool {
        c.r >= 128 && c.g >= 128 && c.b >= 128
    }

    #[test]
    fn same_assignee_same_color() {
        let mut colors = ColorAllocator::seeded(7);
        let a = colors.color_for("Alice");
        let b = colors.color_for("Bob");
        assert_eq!(colors.color_for("Alice"), a);
        assert_eq!(colors.color_for("Bob"), b);
        assert_eq!(colors.len(), 2);
    }

    #[test]
    fn colors_are_pastel() {
        let mut colors = ColorAllocator::seeded(1);
        for i in 0..200 {
            assert!(is_pastel(colors.color_for(&format!("member-{i}"))));
        }
    }

    #[test]
    fn first_seen_order() {
        let mut colors = ColorAllocator::seeded(3);
        colors.color_for("Carol");
        colors.color_for("Alice");
        colors.color_for("Carol");
        colors.color_for("Bob");
        let names: Vec<&str> = colors.entries().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Carol", "Alice", "Bob"]);
    }

    #[test]
    fn distinct_assignees_get_distinct_colors() {
        let mut colors = ColorAllocator::seeded(11);
        let picked: Vec<Rgb> = (0..20).map(|i| colors.color_for(&i.to_string())).collect();
        for (i, a) in picked.iter().enumerate() {
            for b in &picked[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn seeded_allocators_agree() {
        let mut a = ColorAllocator::seeded(42);
        let mut b = ColorAllocator::seeded(42);
        assert_eq!(a.color_for("Alice"), b.color_for("Alice"));
    }

    #[test]
    fn reset_clears_allocations() {
        let mut colors = ColorAllocator::seeded(5);
        colors.color_for("Alice");
        colors.reset();
        assert!(colors.is_empty());
        assert_eq!(colors.get("Alice"), None);
    }

    #[test]
    fn hex_form_is_seven_chars() {
        let mut colors = ColorAllocator::new();
        let hex = colors.color_for("Alice").to_hex();
        assert_eq!(hex.len(), 7);
        assert!(hex.starts_with('#'));
    }
}
