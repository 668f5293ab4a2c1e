use crate::hypothesis::{GeneCount, Hypothesis};

/// Per-individual accumulated probability mass.
#[derive(Debug, Clone, PartialEq, Default)]
struct Buckets {
    /// Mass per gene-copy count, indexed 0..=2.
    gene: [f64; 3],
    /// Mass per trait value, indexed `[trait present as usize]`.
    trait_mass: [f64; 2],
}

/// Posterior distributions over gene-copy count and trait presence for
/// every individual in a pedigree.
///
/// Created zeroed, filled by [`PosteriorTable::accumulate`] during
/// hypothesis enumeration, and finalized once by
/// [`PosteriorTable::normalize`]. Tables over the same pedigree combine
/// with [`PosteriorTable::merge`], which is associative and commutative,
/// so accumulation works equally as a sequential loop or a parallel
/// map-reduce over partial tables.
#[derive(Debug, Clone, PartialEq)]
pub struct PosteriorTable {
    entries: Vec<Buckets>,
}

impl PosteriorTable {
    /// Create a zeroed table for `n_individuals`.
    pub fn new(n_individuals: usize) -> Self {
        Self {
            entries: vec![Buckets::default(); n_individuals],
        }
    }

    /// Number of individuals covered by the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fold one hypothesis's joint probability into the table.
    ///
    /// For every individual, adds `p` to the gene bucket and the trait
    /// bucket matching that individual's assignment in `hypothesis`.
    /// Call order does not matter.
    pub fn accumulate(&mut self, hypothesis: &Hypothesis, p: f64) {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.gene[hypothesis.gene_count(i).copies()] += p;
            entry.trait_mass[hypothesis.has_trait(i) as usize] += p;
        }
    }

    /// Pointwise addition of another table over the same pedigree.
    ///
    /// # Panics
    /// Panics if the tables cover different numbers of individuals; merging
    /// tables from different pedigrees is a contract violation.
    pub fn merge(&mut self, other: &PosteriorTable) {
        assert_eq!(
            self.entries.len(),
            other.entries.len(),
            "cannot merge posterior tables over different pedigrees"
        );
        for (mine, theirs) in self.entries.iter_mut().zip(&other.entries) {
            for c in 0..3 {
                mine.gene[c] += theirs.gene[c];
            }
            for t in 0..2 {
                mine.trait_mass[t] += theirs.trait_mass[t];
            }
        }
    }

    /// Rescale every distribution to sum to 1, preserving relative
    /// proportions.
    ///
    /// Each distribution is divided by its own total: the gene buckets by
    /// the gene total and the trait buckets by the trait total,
    /// independently. A distribution whose total is exactly zero is left
    /// unmodified; that signals impossible evidence rather than a division
    /// error.
    pub fn normalize(&mut self) {
        for entry in &mut self.entries {
            let gene_total: f64 = entry.gene.iter().sum();
            if gene_total != 0.0 {
                for mass in &mut entry.gene {
                    *mass /= gene_total;
                }
            }
            let trait_total: f64 = entry.trait_mass.iter().sum();
            if trait_total != 0.0 {
                for mass in &mut entry.trait_mass {
                    *mass /= trait_total;
                }
            }
        }
    }

    /// Probability mass for `count` copies at individual `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn gene(&self, index: usize, count: GeneCount) -> f64 {
        self.entries[index].gene[count.copies()]
    }

    /// Probability mass for the trait being `present` at individual
    /// `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn trait_prob(&self, index: usize, present: bool) -> f64 {
        self.entries[index].trait_mass[present as usize]
    }

    /// Gene distribution for individual `index`, bucket order 0, 1, 2.
    pub fn gene_distribution(&self, index: usize) -> [f64; 3] {
        self.entries[index].gene
    }

    /// Trait distribution for individual `index` as (present, absent).
    pub fn trait_distribution(&self, index: usize) -> (f64, f64) {
        let m = &self.entries[index].trait_mass;
        (m[1], m[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_accumulate_routes_mass_to_matching_buckets() {
        let mut table = PosteriorTable::new(2);
        // Individual 0: one copy, trait present. Individual 1: zero
        // copies, trait absent.
        table.accumulate(&Hypothesis::new(0b01, 0, 0b01), 0.25);

        assert_relative_eq!(table.gene(0, GeneCount::One), 0.25);
        assert_relative_eq!(table.gene(0, GeneCount::Zero), 0.0);
        assert_relative_eq!(table.trait_prob(0, true), 0.25);
        assert_relative_eq!(table.trait_prob(0, false), 0.0);

        assert_relative_eq!(table.gene(1, GeneCount::Zero), 0.25);
        assert_relative_eq!(table.trait_prob(1, false), 0.25);
    }

    #[test]
    fn test_each_hypothesis_deposits_full_mass_in_each_distribution() {
        let mut table = PosteriorTable::new(1);
        table.accumulate(&Hypothesis::new(0, 1, 1), 0.4);
        table.accumulate(&Hypothesis::new(1, 0, 0), 0.1);

        let gene_total: f64 = table.gene_distribution(0).iter().sum();
        let (t, f) = table.trait_distribution(0);
        assert_relative_eq!(gene_total, 0.5);
        assert_relative_eq!(t + f, 0.5);
        assert_relative_eq!(gene_total, t + f);
    }

    #[test]
    fn test_merge_equals_interleaved_accumulation() {
        let hyp_a = Hypothesis::new(0b01, 0b10, 0b11);
        let hyp_b = Hypothesis::new(0b10, 0, 0b01);

        let mut sequential = PosteriorTable::new(2);
        sequential.accumulate(&hyp_a, 0.3);
        sequential.accumulate(&hyp_b, 0.2);

        let mut left = PosteriorTable::new(2);
        left.accumulate(&hyp_a, 0.3);
        let mut right = PosteriorTable::new(2);
        right.accumulate(&hyp_b, 0.2);
        left.merge(&right);

        assert_eq!(left, sequential);
    }

    #[test]
    #[should_panic(expected = "different pedigrees")]
    fn test_merge_size_mismatch_panics() {
        let mut a = PosteriorTable::new(2);
        let b = PosteriorTable::new(3);
        a.merge(&b);
    }

    #[test]
    fn test_normalize_preserves_ratios() {
        let mut table = PosteriorTable::new(1);
        table.accumulate(&Hypothesis::new(1, 0, 1), 0.6);
        table.accumulate(&Hypothesis::new(0, 1, 0), 0.2);
        table.normalize();

        assert_relative_eq!(table.gene(0, GeneCount::One), 0.75);
        assert_relative_eq!(table.gene(0, GeneCount::Two), 0.25);
        assert_relative_eq!(table.gene(0, GeneCount::Zero), 0.0);
        assert_relative_eq!(table.trait_prob(0, true), 0.75);
        assert_relative_eq!(table.trait_prob(0, false), 0.25);
    }

    #[test]
    fn test_normalize_leaves_zero_mass_untouched() {
        let mut table = PosteriorTable::new(1);
        table.normalize();
        assert_eq!(table.gene_distribution(0), [0.0; 3]);
        assert_eq!(table.trait_distribution(0), (0.0, 0.0));
    }

    #[test]
    fn test_normalize_distributions_independently() {
        // Gene mass present, trait mass zeroed by hand: only the gene
        // distribution gets rescaled.
        let mut table = PosteriorTable::new(1);
        table.entries[0].gene = [0.2, 0.2, 0.0];
        table.normalize();

        assert_relative_eq!(table.gene(0, GeneCount::Zero), 0.5);
        assert_relative_eq!(table.gene(0, GeneCount::One), 0.5);
        assert_eq!(table.trait_distribution(0), (0.0, 0.0));
    }
}
