//! Projecting parameters into variable sets and reading them back

use crate::diagnostics::Diagnostics;
use crate::error::{SyncError, SyncResult};
use crate::host::{Container, Document, ObjectKind};
use crate::types::{ParameterRecord, ParameterSet, Value};

/// Host-managed properties that are not parameters
pub const INTERNAL_PROPERTIES: &[&str] = &["ExpressionEngine", "Label", "Label2", "Visibility"];

pub struct VariableContainerSync {
    default_group: String,
}

impl VariableContainerSync {
    pub fn new(default_group: impl Into<String>) -> Self {
        Self {
            default_group: default_group.into(),
        }
    }

    /// Replace every variable set with one per parameter group.
    ///
    /// With a `binding_table`, each property is the expression
    /// `<binding_table>.<name>`; otherwise it holds the value's magnitude.
    /// Returns the identifiers of the created variable sets.
    pub fn rebuild<D: Document>(
        &self,
        doc: &mut D,
        params: &ParameterSet,
        binding_table: Option<&str>,
        diagnostics: &mut Diagnostics,
    ) -> SyncResult<Vec<String>> {
        for existing in doc.objects_of(ObjectKind::VarSet) {
            doc.remove_object(&existing.identifier)?;
        }

        // (label, records) in order of first appearance
        let mut groups: Vec<(&str, Vec<&ParameterRecord>)> = Vec::new();
        for record in params {
            let label = record.group.as_deref().unwrap_or(&self.default_group);
            match groups.iter_mut().find(|(l, _)| *l == label) {
                Some((_, records)) => records.push(record),
                None => groups.push((label, vec![record])),
            }
        }

        let mut created = Vec::with_capacity(groups.len());
        for (label, records) in &groups {
            let identifier = doc.add_object(ObjectKind::VarSet, label)?;
            let container = doc.container_mut(&identifier).ok_or_else(|| {
                SyncError::Host(format!("Variable set '{}' was not created", identifier))
            })?;

            for record in records {
                container.add_scalar_property(&record.name)?;
                match binding_table {
                    Some(table) => {
                        let expression = format!("{}.{}", table, record.name);
                        container.set_expression(&record.name, &expression)?
                    }
                    None => container.set_literal(&record.name, record.value.magnitude())?,
                }
            }

            diagnostics.info(format!(
                "Variable set '{}' with {} parameter(s)",
                label,
                records.len()
            ));
            created.push(identifier);
        }

        // Only once every property in every set exists
        for identifier in &created {
            if let Some(container) = doc.container_mut(identifier) {
                container.recompute()?;
            }
        }

        Ok(created)
    }

    /// Current variable set properties as dimensionless parameters grouped by
    /// set label. The first occurrence of a name wins.
    pub fn collect<D: Document>(&self, doc: &D) -> ParameterSet {
        let mut params = ParameterSet::new();

        for info in doc.objects_of(ObjectKind::VarSet) {
            let Some(container) = doc.container(&info.identifier) else {
                continue;
            };
            for name in container.properties() {
                if INTERNAL_PROPERTIES.contains(&name.as_str()) || params.contains(&name) {
                    continue;
                }
                let value = container.value(&name).unwrap_or_default();
                params.push(
                    ParameterRecord::new(name, Value::Dimensionless(value), "")
                        .with_group(info.label.clone()),
                );
            }
        }

        params
    }
}
