use rayon::prelude::*;

use crate::enumerate::{
    check_enumerable, evidence_masks, full_mask, hypotheses, satisfies_evidence, GenePartitions,
};
use crate::error::Result;
use crate::hypothesis::Hypothesis;
use crate::joint::joint_probability;
use crate::model::ProbabilityModel;
use crate::pedigree::Pedigree;
use crate::posterior::PosteriorTable;

/// Compute normalized posterior gene and trait distributions for every
/// individual in the pedigree.
///
/// Enumerates every hypothesis consistent with the observed trait
/// evidence, folds each joint probability into the posterior table, then
/// normalizes once at the end. Deterministic and single-threaded; see
/// [`compute_posteriors_parallel`] for the rayon variant.
///
/// # Errors
/// Returns an error if the model or pedigree fails validation, or the
/// pedigree exceeds the enumeration cap.
pub fn compute_posteriors(
    pedigree: &Pedigree,
    model: &ProbabilityModel,
) -> Result<PosteriorTable> {
    model.validate()?;
    pedigree.validate()?;

    let mut table = PosteriorTable::new(pedigree.len());
    let mut n_hypotheses = 0u64;

    for hypothesis in hypotheses(pedigree)? {
        let p = joint_probability(pedigree, model, &hypothesis)?;
        table.accumulate(&hypothesis, p);
        n_hypotheses += 1;
    }

    log::debug!(
        "accumulated {} hypotheses over {} individuals",
        n_hypotheses,
        pedigree.len()
    );

    table.normalize();
    Ok(table)
}

/// Parallel variant of [`compute_posteriors`].
///
/// Distributes the outer trait-subset loop across rayon workers; each
/// worker accumulates a partial posterior table over its gene partitions,
/// and the partials are merged pairwise. Accumulation is commutative
/// addition, so the result is identical to the sequential driver.
///
/// # Errors
/// Same conditions as [`compute_posteriors`].
pub fn compute_posteriors_parallel(
    pedigree: &Pedigree,
    model: &ProbabilityModel,
) -> Result<PosteriorTable> {
    model.validate()?;
    pedigree.validate()?;
    check_enumerable(pedigree)?;

    let n = pedigree.len();
    let all = full_mask(n);
    let (must_have, must_not) = evidence_masks(pedigree);

    let trait_subsets: Vec<u32> = (0..=all)
        .filter(|&t| satisfies_evidence(t, must_have, must_not))
        .collect();
    log::debug!(
        "{} of {} trait subsets survive evidence filtering",
        trait_subsets.len(),
        u64::from(all) + 1
    );

    let mut table = trait_subsets
        .into_par_iter()
        .map(|have_trait| -> Result<PosteriorTable> {
            let mut partial = PosteriorTable::new(n);
            for (one_gene, two_genes) in GenePartitions::new(all) {
                let hypothesis = Hypothesis::new(one_gene, two_genes, have_trait);
                let p = joint_probability(pedigree, model, &hypothesis)?;
                partial.accumulate(&hypothesis, p);
            }
            Ok(partial)
        })
        .try_reduce(
            || PosteriorTable::new(n),
            |mut a, b| {
                a.merge(&b);
                Ok(a)
            },
        )?;

    table.normalize();
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hypothesis::GeneCount;
    use approx::assert_relative_eq;

    fn record(
        name: &str,
        mother: Option<&str>,
        father: Option<&str>,
        observed_trait: Option<bool>,
    ) -> (String, Option<String>, Option<String>, Option<bool>) {
        (
            name.to_string(),
            mother.map(str::to_string),
            father.map(str::to_string),
            observed_trait,
        )
    }

    #[test]
    fn test_isolated_individual_recovers_prior() {
        let ped = Pedigree::from_records(&[record("Solo", None, None, None)]).unwrap();
        let model = ProbabilityModel::default();
        let table = compute_posteriors(&ped, &model).unwrap();

        assert_relative_eq!(table.gene(0, GeneCount::Zero), 0.96, epsilon = 1e-12);
        assert_relative_eq!(table.gene(0, GeneCount::One), 0.03, epsilon = 1e-12);
        assert_relative_eq!(table.gene(0, GeneCount::Two), 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_pedigree_fails_before_enumeration() {
        let ped = Pedigree::from_records(&[
            record("Mum", None, None, None),
            record("Kid", Some("Mum"), None, None),
        ])
        .unwrap();
        let model = ProbabilityModel::default();
        assert!(compute_posteriors(&ped, &model).is_err());
        assert!(compute_posteriors_parallel(&ped, &model).is_err());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let ped = Pedigree::from_records(&[
            record("Mum", None, None, Some(false)),
            record("Dad", None, None, Some(true)),
            record("Kid", Some("Mum"), Some("Dad"), None),
            record("Sib", Some("Mum"), Some("Dad"), Some(true)),
        ])
        .unwrap();
        let model = ProbabilityModel::default();

        let sequential = compute_posteriors(&ped, &model).unwrap();
        let parallel = compute_posteriors_parallel(&ped, &model).unwrap();

        for i in 0..ped.len() {
            for count in GeneCount::ALL {
                assert_relative_eq!(
                    sequential.gene(i, count),
                    parallel.gene(i, count),
                    epsilon = 1e-12
                );
            }
            assert_relative_eq!(
                sequential.trait_prob(i, true),
                parallel.trait_prob(i, true),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_empty_pedigree() {
        let table = compute_posteriors(&Pedigree::new(), &ProbabilityModel::default()).unwrap();
        assert!(table.is_empty());
    }
}
