use crate::error::{HeredityError, Result};

/// Number of copies of the variant allele an individual carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneCount {
    Zero,
    One,
    Two,
}

impl GeneCount {
    /// All counts, in bucket order 0, 1, 2.
    pub const ALL: [GeneCount; 3] = [GeneCount::Zero, GeneCount::One, GeneCount::Two];

    /// The copy count as an integer, usable as a distribution bucket index.
    pub fn copies(self) -> usize {
        match self {
            GeneCount::Zero => 0,
            GeneCount::One => 1,
            GeneCount::Two => 2,
        }
    }
}

impl std::fmt::Display for GeneCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.copies())
    }
}

/// One complete assignment of gene-copy counts and trait values to every
/// individual in a pedigree.
///
/// Individuals are identified by their 0-based pedigree index; each of the
/// three fields is a bitmask over those indices. An individual in neither
/// `one_gene` nor `two_genes` carries zero copies, and an individual not in
/// `have_trait` does not have the trait, so every index carries a complete
/// assignment. `one_gene` and `two_genes` must be disjoint.
///
/// Hypotheses are transient: produced by the enumerator, consumed by the
/// joint-probability evaluator, then discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hypothesis {
    /// Individuals carrying exactly one copy.
    pub one_gene: u32,
    /// Individuals carrying exactly two copies.
    pub two_genes: u32,
    /// Individuals with the trait.
    pub have_trait: u32,
}

impl Hypothesis {
    pub fn new(one_gene: u32, two_genes: u32, have_trait: u32) -> Self {
        Self {
            one_gene,
            two_genes,
            have_trait,
        }
    }

    /// Gene-copy count assigned to the individual at `index`.
    pub fn gene_count(&self, index: usize) -> GeneCount {
        let bit = 1u32 << index;
        if self.one_gene & bit != 0 {
            GeneCount::One
        } else if self.two_genes & bit != 0 {
            GeneCount::Two
        } else {
            GeneCount::Zero
        }
    }

    /// Whether the individual at `index` has the trait in this hypothesis.
    pub fn has_trait(&self, index: usize) -> bool {
        self.have_trait & (1u32 << index) != 0
    }

    /// Check that this hypothesis is a well-formed assignment over a
    /// pedigree of `n_individuals`.
    ///
    /// # Errors
    /// Returns [`HeredityError::InvalidHypothesis`] if `one_gene` and
    /// `two_genes` overlap, or any mask references an index outside the
    /// pedigree. Both are programming-contract violations, not user errors.
    pub fn validate(&self, n_individuals: usize) -> Result<()> {
        if self.one_gene & self.two_genes != 0 {
            return Err(HeredityError::InvalidHypothesis(format!(
                "one-gene and two-gene sets overlap (mask {:#b})",
                self.one_gene & self.two_genes
            )));
        }

        let valid = if n_individuals >= 32 {
            u32::MAX
        } else {
            (1u32 << n_individuals) - 1
        };
        let out_of_range = (self.one_gene | self.two_genes | self.have_trait) & !valid;
        if out_of_range != 0 {
            return Err(HeredityError::InvalidHypothesis(format!(
                "assignment references individuals outside the pedigree of {} (mask {:#b})",
                n_individuals, out_of_range
            )));
        }

        Ok(())
    }
}
