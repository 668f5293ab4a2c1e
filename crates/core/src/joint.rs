use crate::error::{HeredityError, Result};
use crate::hypothesis::{GeneCount, Hypothesis};
use crate::model::ProbabilityModel;
use crate::pedigree::Pedigree;

/// Compute the joint probability of one complete hypothesis under the
/// model.
///
/// The model is a Bayesian network: each individual's gene count depends
/// only on the parents' gene counts (or the unconditional prior for
/// founders), and each individual's trait depends only on its own gene
/// count, so the joint factorizes into one term per individual. Factors are
/// multiplied in pedigree index order, which keeps evaluation deterministic
/// although the product is order-independent.
///
/// The result lies in [0, 1] and is zero only when some factor is exactly
/// zero. Underflow is possible for large pedigrees; the enumeration cap in
/// [`crate::enumerate::MAX_INDIVIDUALS`] keeps sizes well short of that.
///
/// # Errors
/// Returns [`HeredityError::InvalidHypothesis`] for a malformed hypothesis
/// (overlapping gene sets or out-of-range indices) and
/// [`HeredityError::InvalidPedigree`] if an individual has exactly one
/// recorded parent. Both indicate contract violations by the caller, not
/// user input problems.
pub fn joint_probability(
    pedigree: &Pedigree,
    model: &ProbabilityModel,
    hypothesis: &Hypothesis,
) -> Result<f64> {
    hypothesis.validate(pedigree.len())?;

    let mut joint = 1.0;

    for i in 0..pedigree.len() {
        let count = hypothesis.gene_count(i);
        let trait_present = hypothesis.has_trait(i);

        let p_gene = match (pedigree.mother(i), pedigree.father(i)) {
            (None, None) => model.gene_prior(count),
            (Some(m), Some(f)) => {
                let p_mother = model.transmission_prob(hypothesis.gene_count(m));
                let p_father = model.transmission_prob(hypothesis.gene_count(f));
                child_gene_prob(count, p_mother, p_father)
            }
            _ => {
                return Err(HeredityError::InvalidPedigree(format!(
                    "Individual '{}' has exactly one recorded parent",
                    pedigree.name(i)
                )))
            }
        };

        joint *= p_gene * model.trait_given_gene(count, trait_present);
    }

    Ok(joint)
}

/// Probability a child ends up with `count` copies given each parent's
/// probability of transmitting the variant.
///
/// Two copies requires a transmission from both parents, zero copies from
/// neither, and one copy from exactly one of the two.
fn child_gene_prob(count: GeneCount, p_mother: f64, p_father: f64) -> f64 {
    match count {
        GeneCount::Two => p_father * p_mother,
        GeneCount::One => p_father * (1.0 - p_mother) + p_mother * (1.0 - p_father),
        GeneCount::Zero => (1.0 - p_father) * (1.0 - p_mother),
    }
}
