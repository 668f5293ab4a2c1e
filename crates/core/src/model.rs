use crate::error::{HeredityError, Result};
use crate::hypothesis::GeneCount;

/// Tolerance when checking that a probability table row sums to 1.
const SUM_TOLERANCE: f64 = 1e-9;

/// The fixed parameters of the heredity model.
///
/// Holds the unconditional prior over gene-copy count, the conditional
/// distribution of the trait given gene-copy count, and the per-copy
/// mutation rate applied during parent-to-child transmission.
///
/// The model is an immutable value constructed once and passed explicitly
/// into the inference functions, so tests can substitute alternative
/// probability tables. [`ProbabilityModel::default`] supplies the reference
/// parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityModel {
    /// P(gene count = c), indexed by copy count 0..=2.
    gene_prior: [f64; 3],
    /// P(trait | gene count), indexed `[copies][trait present as usize]`.
    trait_given_gene: [[f64; 2]; 3],
    /// Probability a transmitted copy flips identity (variant <-> normal).
    mutation_rate: f64,
}

impl Default for ProbabilityModel {
    fn default() -> Self {
        Self {
            gene_prior: [0.96, 0.03, 0.01],
            trait_given_gene: [
                [0.99, 0.01], // 0 copies: trait absent 0.99, present 0.01
                [0.44, 0.56], // 1 copy
                [0.35, 0.65], // 2 copies
            ],
            mutation_rate: 0.01,
        }
    }
}

impl ProbabilityModel {
    /// Construct a model from explicit probability tables.
    ///
    /// `trait_given_gene` is indexed `[copies][trait present as usize]`.
    ///
    /// # Errors
    /// Returns an error if the prior does not sum to 1, any conditional
    /// trait row does not sum to 1, or any value lies outside [0, 1].
    pub fn new(
        gene_prior: [f64; 3],
        trait_given_gene: [[f64; 2]; 3],
        mutation_rate: f64,
    ) -> Result<Self> {
        let model = Self {
            gene_prior,
            trait_given_gene,
            mutation_rate,
        };
        model.validate()?;
        Ok(model)
    }

    /// The reference model with a different mutation rate.
    ///
    /// # Errors
    /// Returns an error if `mutation_rate` lies outside [0, 1].
    pub fn with_mutation_rate(mutation_rate: f64) -> Result<Self> {
        let model = Self {
            mutation_rate,
            ..Self::default()
        };
        model.validate()?;
        Ok(model)
    }

    /// Unconditional prior probability of carrying `count` copies.
    pub fn gene_prior(&self, count: GeneCount) -> f64 {
        self.gene_prior[count.copies()]
    }

    /// Conditional probability of the trait observation given `count` copies.
    pub fn trait_given_gene(&self, count: GeneCount, trait_present: bool) -> f64 {
        self.trait_given_gene[count.copies()][trait_present as usize]
    }

    /// Probability a transmitted gene copy flips during inheritance.
    pub fn mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    /// Probability that a parent carrying `count` copies transmits the
    /// variant to a child.
    ///
    /// - 2 copies: the variant is always picked, so it arrives unless
    ///   mutation flips it away: `1 - mu`.
    /// - 1 copy: a fair coin picks one of the two chromosomes, each
    ///   independently subject to mutation, which simplifies to
    ///   `0.5 * (1 - mu) + 0.5 * mu = 0.5` exactly.
    /// - 0 copies: the variant can only arrive via mutation: `mu`.
    pub fn transmission_prob(&self, count: GeneCount) -> f64 {
        match count {
            GeneCount::Two => 1.0 - self.mutation_rate,
            GeneCount::One => 0.5,
            GeneCount::Zero => self.mutation_rate,
        }
    }

    /// Check that the model is a coherent set of probability tables.
    ///
    /// # Errors
    /// Returns [`HeredityError::Model`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        for (c, &p) in self.gene_prior.iter().enumerate() {
            if !(0.0..=1.0).contains(&p) {
                return Err(HeredityError::Model(format!(
                    "Gene prior for {} copies is {} (must be in [0, 1])",
                    c, p
                )));
            }
        }

        let prior_sum: f64 = self.gene_prior.iter().sum();
        if (prior_sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(HeredityError::Model(format!(
                "Gene prior sums to {} (must sum to 1)",
                prior_sum
            )));
        }

        for (c, row) in self.trait_given_gene.iter().enumerate() {
            for &p in row {
                if !(0.0..=1.0).contains(&p) {
                    return Err(HeredityError::Model(format!(
                        "Trait probability for {} copies is {} (must be in [0, 1])",
                        c, p
                    )));
                }
            }
            let row_sum: f64 = row.iter().sum();
            if (row_sum - 1.0).abs() > SUM_TOLERANCE {
                return Err(HeredityError::Model(format!(
                    "Trait distribution for {} copies sums to {} (must sum to 1)",
                    c, row_sum
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(HeredityError::Model(format!(
                "Mutation rate is {} (must be in [0, 1])",
                self.mutation_rate
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_model_is_valid() {
        let model = ProbabilityModel::default();
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_default_lookups() {
        let model = ProbabilityModel::default();
        assert_relative_eq!(model.gene_prior(GeneCount::Zero), 0.96);
        assert_relative_eq!(model.gene_prior(GeneCount::One), 0.03);
        assert_relative_eq!(model.gene_prior(GeneCount::Two), 0.01);

        assert_relative_eq!(model.trait_given_gene(GeneCount::Zero, true), 0.01);
        assert_relative_eq!(model.trait_given_gene(GeneCount::Zero, false), 0.99);
        assert_relative_eq!(model.trait_given_gene(GeneCount::One, true), 0.56);
        assert_relative_eq!(model.trait_given_gene(GeneCount::Two, false), 0.35);

        assert_relative_eq!(model.mutation_rate(), 0.01);
    }

    #[test]
    fn test_transmission_probs() {
        let model = ProbabilityModel::default();
        assert_relative_eq!(model.transmission_prob(GeneCount::Two), 0.99);
        // Exactly 0.5 regardless of the mutation rate.
        assert_eq!(model.transmission_prob(GeneCount::One), 0.5);
        assert_relative_eq!(model.transmission_prob(GeneCount::Zero), 0.01);

        let model = ProbabilityModel::with_mutation_rate(0.2).unwrap();
        assert_relative_eq!(model.transmission_prob(GeneCount::Two), 0.8);
        assert_eq!(model.transmission_prob(GeneCount::One), 0.5);
    }

    #[test]
    fn test_prior_must_sum_to_one() {
        let result = ProbabilityModel::new(
            [0.9, 0.05, 0.01],
            ProbabilityModel::default().trait_given_gene,
            0.01,
        );
        assert!(result.is_err());
        let msg = format!("{}", result.unwrap_err());
        assert!(msg.contains("sums to"), "Error was: {}", msg);
    }

    #[test]
    fn test_trait_row_must_sum_to_one() {
        let result = ProbabilityModel::new(
            [0.96, 0.03, 0.01],
            [[0.99, 0.01], [0.5, 0.56], [0.35, 0.65]],
            0.01,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_mutation_rate_out_of_range() {
        assert!(ProbabilityModel::with_mutation_rate(-0.1).is_err());
        assert!(ProbabilityModel::with_mutation_rate(1.5).is_err());
        assert!(ProbabilityModel::with_mutation_rate(0.0).is_ok());
        assert!(ProbabilityModel::with_mutation_rate(1.0).is_ok());
    }
}
