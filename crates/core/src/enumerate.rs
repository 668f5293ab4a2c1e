use crate::error::{HeredityError, Result};
use crate::hypothesis::Hypothesis;
use crate::pedigree::Pedigree;

/// Largest pedigree the exhaustive enumerator will accept.
///
/// Enumeration visits on the order of 6^n hypotheses (3^n gene partitions
/// times up to 2^n trait subsets), so anything beyond a handful of
/// individuals is impractical; 20 also keeps subset bitmasks inside `u32`.
pub const MAX_INDIVIDUALS: usize = 20;

/// Bitmask with one bit set per individual in a pedigree of `n`.
pub(crate) fn full_mask(n: usize) -> u32 {
    (1u32 << n) - 1
}

/// Trait-evidence masks: individuals observed with the trait and
/// individuals observed without it.
pub(crate) fn evidence_masks(pedigree: &Pedigree) -> (u32, u32) {
    let mut must_have = 0u32;
    let mut must_not = 0u32;
    for (i, ind) in pedigree.individuals().enumerate() {
        match ind.observed_trait() {
            Some(true) => must_have |= 1 << i,
            Some(false) => must_not |= 1 << i,
            None => {}
        }
    }
    (must_have, must_not)
}

/// Whether a candidate trait subset agrees with every observed trait value.
pub(crate) fn satisfies_evidence(have_trait: u32, must_have: u32, must_not: u32) -> bool {
    have_trait & must_have == must_have && have_trait & must_not == 0
}

pub(crate) fn check_enumerable(pedigree: &Pedigree) -> Result<()> {
    if pedigree.len() > MAX_INDIVIDUALS {
        return Err(HeredityError::InvalidPedigree(format!(
            "Pedigree has {} individuals; exhaustive enumeration supports at most {}",
            pedigree.len(),
            MAX_INDIVIDUALS
        )));
    }
    Ok(())
}

/// Iterator over all gene partitions of a fixed set of individuals.
///
/// Yields `(one_gene, two_genes)` mask pairs: every subset of the
/// individuals as the one-copy set, crossed with every subset of the
/// remainder as the two-copy set. Individuals in neither set carry zero
/// copies. Yields 3^n pairs, always at least one (the all-zero-copies
/// partition).
pub(crate) struct GenePartitions {
    all: u32,
    one_gene: u32,
    two_genes: u32,
    exhausted: bool,
}

impl GenePartitions {
    pub(crate) fn new(all: u32) -> Self {
        Self {
            all,
            one_gene: 0,
            // Submask walk over the complement starts at the complement
            // itself and descends to zero.
            two_genes: all,
            exhausted: false,
        }
    }
}

impl Iterator for GenePartitions {
    type Item = (u32, u32);

    fn next(&mut self) -> Option<(u32, u32)> {
        if self.exhausted {
            return None;
        }
        let item = (self.one_gene, self.two_genes);

        // Advance: next two-gene submask of the complement, then next
        // one-gene subset once the walk bottoms out.
        if self.two_genes != 0 {
            let complement = self.all & !self.one_gene;
            self.two_genes = (self.two_genes - 1) & complement;
        } else if self.one_gene != self.all {
            self.one_gene += 1;
            self.two_genes = self.all & !self.one_gene;
        } else {
            self.exhausted = true;
        }

        Some(item)
    }
}

/// Lazy iterator over every hypothesis consistent with the pedigree's
/// observed trait evidence.
///
/// The outer loop walks candidate trait subsets, discarding any that
/// contradict an observed trait value; the inner loop walks all gene
/// partitions. Gene counts are latent, so no evidence filtering applies to
/// them. The sequence is finite and each call to [`hypotheses`] starts a
/// fresh traversal.
pub struct HypothesisIter {
    all: u32,
    must_have: u32,
    must_not: u32,
    have_trait: u32,
    partitions: GenePartitions,
    exhausted: bool,
}

impl Iterator for HypothesisIter {
    type Item = Hypothesis;

    fn next(&mut self) -> Option<Hypothesis> {
        loop {
            if self.exhausted {
                return None;
            }
            if let Some((one_gene, two_genes)) = self.partitions.next() {
                return Some(Hypothesis::new(one_gene, two_genes, self.have_trait));
            }

            // Current trait subset finished; advance to the next one that
            // agrees with the evidence.
            match self.next_trait_subset() {
                Some(t) => {
                    self.have_trait = t;
                    self.partitions = GenePartitions::new(self.all);
                }
                None => self.exhausted = true,
            }
        }
    }
}

impl HypothesisIter {
    fn new(pedigree: &Pedigree) -> Self {
        let all = full_mask(pedigree.len());
        let (must_have, must_not) = evidence_masks(pedigree);

        // The first valid trait subset always exists: `must_have` itself
        // satisfies the evidence. Start the scan from zero to find it.
        let mut first = 0u32;
        while !satisfies_evidence(first, must_have, must_not) {
            first += 1;
        }

        Self {
            all,
            must_have,
            must_not,
            have_trait: first,
            partitions: GenePartitions::new(all),
            exhausted: false,
        }
    }

    fn next_trait_subset(&self) -> Option<u32> {
        let mut t = self.have_trait;
        while t < self.all {
            t += 1;
            if satisfies_evidence(t, self.must_have, self.must_not) {
                return Some(t);
            }
        }
        None
    }
}

/// Enumerate every hypothesis consistent with the pedigree's observed
/// trait values, as a lazy finite sequence.
///
/// # Errors
/// Returns [`HeredityError::InvalidPedigree`] if the pedigree exceeds
/// [`MAX_INDIVIDUALS`].
pub fn hypotheses(pedigree: &Pedigree) -> Result<HypothesisIter> {
    check_enumerable(pedigree)?;
    Ok(HypothesisIter::new(pedigree))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        name: &str,
        observed_trait: Option<bool>,
    ) -> (String, Option<String>, Option<String>, Option<bool>) {
        (name.to_string(), None, None, observed_trait)
    }

    #[test]
    fn test_gene_partitions_count_is_3_pow_n() {
        for n in 0..5usize {
            let count = GenePartitions::new(full_mask(n)).count();
            assert_eq!(count, 3usize.pow(n as u32), "n = {}", n);
        }
    }

    #[test]
    fn test_gene_partitions_disjoint_and_unique() {
        let all = full_mask(3);
        let pairs: Vec<(u32, u32)> = GenePartitions::new(all).collect();
        for &(g1, g2) in &pairs {
            assert_eq!(g1 & g2, 0, "overlapping partition ({:#b}, {:#b})", g1, g2);
            assert_eq!(g1 & !all, 0);
            assert_eq!(g2 & !all, 0);
        }
        let mut dedup = pairs.clone();
        dedup.sort_unstable();
        dedup.dedup();
        assert_eq!(dedup.len(), pairs.len(), "duplicate partitions");
    }

    #[test]
    fn test_no_evidence_yields_full_cross_product() {
        let ped = Pedigree::from_records(&[record("A", None), record("B", None)]).unwrap();
        // 4 trait subsets x 9 gene partitions.
        assert_eq!(hypotheses(&ped).unwrap().count(), 36);
    }

    #[test]
    fn test_empty_pedigree_yields_single_hypothesis() {
        let ped = Pedigree::new();
        let hyps: Vec<Hypothesis> = hypotheses(&ped).unwrap().collect();
        assert_eq!(hyps, [Hypothesis::new(0, 0, 0)]);
    }

    #[test]
    fn test_observed_true_constrains_trait_subsets() {
        let ped = Pedigree::from_records(&[record("A", Some(true)), record("B", None)]).unwrap();
        let a = ped.index_of("A").unwrap();

        let hyps: Vec<Hypothesis> = hypotheses(&ped).unwrap().collect();
        // Trait subsets halved: 2 x 9 gene partitions.
        assert_eq!(hyps.len(), 18);
        assert!(hyps.iter().all(|h| h.has_trait(a)));
    }

    #[test]
    fn test_observed_false_constrains_trait_subsets() {
        let ped =
            Pedigree::from_records(&[record("A", Some(false)), record("B", Some(true))]).unwrap();
        let a = ped.index_of("A").unwrap();
        let b = ped.index_of("B").unwrap();

        let hyps: Vec<Hypothesis> = hypotheses(&ped).unwrap().collect();
        assert_eq!(hyps.len(), 9);
        assert!(hyps.iter().all(|h| !h.has_trait(a) && h.has_trait(b)));
    }

    #[test]
    fn test_restartable() {
        let ped = Pedigree::from_records(&[record("A", Some(true)), record("B", None)]).unwrap();
        let first: Vec<Hypothesis> = hypotheses(&ped).unwrap().collect();
        let second: Vec<Hypothesis> = hypotheses(&ped).unwrap().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_every_gene_assignment_appears_per_individual() {
        let ped = Pedigree::from_records(&[record("A", None)]).unwrap();
        let mut seen = [false; 3];
        for hyp in hypotheses(&ped).unwrap() {
            seen[hyp.gene_count(0).copies()] = true;
        }
        assert_eq!(seen, [true; 3]);
    }

    #[test]
    fn test_rejects_oversized_pedigree() {
        let records: Vec<_> = (0..=MAX_INDIVIDUALS)
            .map(|i| record(&format!("ind{}", i), None))
            .collect();
        let ped = Pedigree::from_records(&records).unwrap();
        assert!(hypotheses(&ped).is_err());
    }
}
