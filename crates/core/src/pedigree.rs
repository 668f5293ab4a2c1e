use std::collections::HashMap;
use std::path::Path;

use crate::error::{HeredityError, Result};

/// A single pedigree record: an individual with optional parents and an
/// optional observed trait value.
#[derive(Debug, Clone)]
pub struct Individual {
    /// Unique name of the individual.
    name: String,
    /// Index of the mother in the pedigree, or `None` if unrecorded.
    mother: Option<usize>,
    /// Index of the father in the pedigree, or `None` if unrecorded.
    father: Option<usize>,
    /// Observed trait value, or `None` if unknown.
    observed_trait: Option<bool>,
}

impl Individual {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mother(&self) -> Option<usize> {
        self.mother
    }

    pub fn father(&self) -> Option<usize> {
        self.father
    }

    pub fn observed_trait(&self) -> Option<bool> {
        self.observed_trait
    }

    /// Whether this individual has no recorded parents and therefore uses
    /// the unconditional gene prior.
    pub fn is_founder(&self) -> bool {
        self.mother.is_none() && self.father.is_none()
    }
}

/// Pedigree of individuals with parent-offspring relationships and observed
/// trait evidence.
///
/// Internally, individuals are mapped to contiguous 0-based indices in
/// insertion order, so all iteration is deterministic. Parents are either
/// both recorded or both unrecorded; half-recorded pairs are rejected by
/// [`Pedigree::validate`].
#[derive(Debug, Clone, Default)]
pub struct Pedigree {
    /// Ordered list of individuals.
    records: Vec<Individual>,
    /// Mapping from individual name to its 0-based index.
    name_to_index: HashMap<String, usize>,
}

impl Pedigree {
    /// Create an empty pedigree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of individuals in the pedigree.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up the 0-based index of an individual by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// Look up the name of the individual at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn name(&self, index: usize) -> &str {
        &self.records[index].name
    }

    /// Mother index for the individual at `index`, or `None` if unrecorded.
    pub fn mother(&self, index: usize) -> Option<usize> {
        self.records[index].mother
    }

    /// Father index for the individual at `index`, or `None` if unrecorded.
    pub fn father(&self, index: usize) -> Option<usize> {
        self.records[index].father
    }

    /// Observed trait value for the individual at `index`, or `None` if
    /// unknown.
    pub fn observed_trait(&self, index: usize) -> Option<bool> {
        self.records[index].observed_trait
    }

    /// Iterate over individuals in index order.
    pub fn individuals(&self) -> impl Iterator<Item = &Individual> {
        self.records.iter()
    }

    /// Number of individuals with no recorded parents.
    pub fn n_founders(&self) -> usize {
        self.records.iter().filter(|r| r.is_founder()).count()
    }

    /// Add an individual to the pedigree.
    ///
    /// `mother` and `father` are optional parent names, which must already
    /// be present in the pedigree. Use [`Pedigree::from_records`] when input
    /// order is not parents-first.
    ///
    /// # Errors
    /// Returns an error if the name already exists or a referenced parent
    /// has not been added.
    pub fn add_individual(
        &mut self,
        name: &str,
        mother: Option<&str>,
        father: Option<&str>,
        observed_trait: Option<bool>,
    ) -> Result<()> {
        if self.name_to_index.contains_key(name) {
            return Err(HeredityError::InvalidPedigree(format!(
                "Duplicate individual name: '{}'",
                name
            )));
        }

        let mother_idx = mother.map(|m| self.resolve_parent(name, m)).transpose()?;
        let father_idx = father.map(|f| self.resolve_parent(name, f)).transpose()?;

        let index = self.records.len();
        self.records.push(Individual {
            name: name.to_string(),
            mother: mother_idx,
            father: father_idx,
            observed_trait,
        });
        self.name_to_index.insert(name.to_string(), index);

        Ok(())
    }

    fn resolve_parent(&self, child: &str, parent: &str) -> Result<usize> {
        self.name_to_index.get(parent).copied().ok_or_else(|| {
            HeredityError::InvalidPedigree(format!(
                "Individual '{}' references unknown parent '{}'",
                child, parent
            ))
        })
    }

    /// Build a pedigree from (name, mother, father, trait) records.
    ///
    /// Parent values of `None` indicate unrecorded parents. Records may
    /// appear in any order; parent references are resolved after all names
    /// are registered.
    ///
    /// # Errors
    /// Returns an error on duplicate names or unresolvable parent
    /// references.
    pub fn from_records(
        records: &[(String, Option<String>, Option<String>, Option<bool>)],
    ) -> Result<Self> {
        let mut ped = Self::new();

        // First pass: register all individuals so parent lookups succeed
        // regardless of input order.
        for (name, _, _, observed_trait) in records {
            if ped.name_to_index.contains_key(name) {
                return Err(HeredityError::InvalidPedigree(format!(
                    "Duplicate individual name: '{}'",
                    name
                )));
            }
            let index = ped.records.len();
            ped.records.push(Individual {
                name: name.clone(),
                mother: None,
                father: None,
                observed_trait: *observed_trait,
            });
            ped.name_to_index.insert(name.clone(), index);
        }

        // Second pass: resolve parent indices.
        for (i, (name, mother, father, _)) in records.iter().enumerate() {
            if let Some(m) = mother {
                let idx = ped.resolve_parent(name, m)?;
                ped.records[i].mother = Some(idx);
            }
            if let Some(f) = father {
                let idx = ped.resolve_parent(name, f)?;
                ped.records[i].father = Some(idx);
            }
        }

        Ok(ped)
    }

    /// Read a pedigree from a CSV file.
    ///
    /// Expected columns (header required): `name`, `mother`, `father`,
    /// `trait`. Parents are blank when unrecorded; the trait column is `1`
    /// (observed present), `0` (observed absent), or blank (unknown).
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, columns are missing,
    /// a trait value is unrecognized, names are duplicated, or a parent
    /// reference does not resolve.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.to_lowercase())
            .collect();

        let column = |name: &str| -> Result<usize> {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                HeredityError::InvalidPedigree(format!("CSV missing '{}' column", name))
            })
        };
        let name_col = column("name")?;
        let mother_col = column("mother")?;
        let father_col = column("father")?;
        let trait_col = column("trait")?;

        let mut records = Vec::new();

        for result in reader.records() {
            let record = result?;

            let field = |col: usize| -> Result<&str> {
                record.get(col).ok_or_else(|| {
                    HeredityError::InvalidPedigree("Short row in CSV".to_string())
                })
            };

            let name = field(name_col)?.to_string();
            if name.is_empty() {
                return Err(HeredityError::InvalidPedigree(
                    "Empty individual name in CSV".to_string(),
                ));
            }
            let mother = parse_parent(field(mother_col)?);
            let father = parse_parent(field(father_col)?);
            let observed_trait = parse_trait(&name, field(trait_col)?)?;

            records.push((name, mother, father, observed_trait));
        }

        Self::from_records(&records)
    }

    /// Validate the pedigree for consistency before inference.
    ///
    /// Checks:
    /// - Parents are recorded both-or-neither (no half-recorded pairs).
    /// - No individual is its own parent.
    /// - No ancestry cycles (Kahn's algorithm).
    ///
    /// Parent references are already resolved to indices at construction,
    /// so unresolvable references cannot reach this point.
    ///
    /// # Errors
    /// Returns an error describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let n = self.records.len();

        for (i, rec) in self.records.iter().enumerate() {
            match (rec.mother, rec.father) {
                (Some(_), None) | (None, Some(_)) => {
                    return Err(HeredityError::InvalidPedigree(format!(
                        "Individual '{}' has exactly one recorded parent; \
                         parents must be recorded both or neither",
                        rec.name
                    )));
                }
                _ => {}
            }
            if rec.mother == Some(i) || rec.father == Some(i) {
                return Err(HeredityError::InvalidPedigree(format!(
                    "Individual '{}' is listed as its own parent",
                    rec.name
                )));
            }
        }

        // Cycle detection via topological sort over parent -> child edges.
        // If some node is never freed, the pedigree contains a cycle.
        let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut in_degree = vec![0u32; n];

        for (i, rec) in self.records.iter().enumerate() {
            if let Some(m) = rec.mother {
                children_of[m].push(i);
                in_degree[i] += 1;
            }
            if let Some(f) = rec.father {
                children_of[f].push(i);
                in_degree[i] += 1;
            }
        }

        let mut queue: Vec<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut visited = 0usize;

        while let Some(node) = queue.pop() {
            visited += 1;
            for &child in &children_of[node] {
                in_degree[child] -= 1;
                if in_degree[child] == 0 {
                    queue.push(child);
                }
            }
        }

        if visited != n {
            return Err(HeredityError::InvalidPedigree(
                "Pedigree contains an ancestry cycle".to_string(),
            ));
        }

        Ok(())
    }
}

/// Parse a parent field, returning `None` for unrecorded parents (blank).
fn parse_parent(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse a trait field: `1` observed present, `0` observed absent, blank
/// unknown.
fn parse_trait(name: &str, s: &str) -> Result<Option<bool>> {
    match s.trim() {
        "" => Ok(None),
        "1" => Ok(Some(true)),
        "0" => Ok(Some(false)),
        other => Err(HeredityError::InvalidPedigree(format!(
            "Individual '{}' has unrecognized trait value '{}' (expected 1, 0, or blank)",
            name, other
        ))),
    }
}
