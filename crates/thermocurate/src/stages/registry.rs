//! Lookup of stage implementations by schema discriminator.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{CurationError, Result};
use crate::schema::StageKind;
use crate::toolkit::Toolkit;

use super::{
    ChargedFilter, DataPointSelector, DuplicatesFilter, ElementsFilter, EnvironmentsFilter,
    IonicLiquidFilter, NComponentsFilter, PressureFilter, PropertyTypesFilter, SmilesFilter,
    SmirksFilter, Stage, StereochemistryFilter, SubstancesFilter, TemperatureFilter,
};

/// Maps each [`StageKind`] to the stage that implements it.
///
/// A workflow resolves all of its stages against a registry once, when it is
/// built.
#[derive(Clone, Default)]
pub struct StageRegistry {
    stages: HashMap<StageKind, Arc<dyn Stage>>,
}

impl StageRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in stage. Stages which inspect
    /// molecules share `toolkit`.
    pub fn with_toolkit(toolkit: Arc<dyn Toolkit>) -> Self {
        let mut registry = Self::new();

        registry.register(Arc::new(DuplicatesFilter));
        registry.register(Arc::new(TemperatureFilter));
        registry.register(Arc::new(PressureFilter));
        registry.register(Arc::new(ElementsFilter::new(toolkit.clone())));
        registry.register(Arc::new(PropertyTypesFilter));
        registry.register(Arc::new(StereochemistryFilter::new(toolkit.clone())));
        registry.register(Arc::new(ChargedFilter::new(toolkit.clone())));
        registry.register(Arc::new(IonicLiquidFilter));
        registry.register(Arc::new(SmilesFilter));
        registry.register(Arc::new(SmirksFilter::new(toolkit.clone())));
        registry.register(Arc::new(NComponentsFilter));
        registry.register(Arc::new(SubstancesFilter));
        registry.register(Arc::new(EnvironmentsFilter::new(toolkit)));
        registry.register(Arc::new(DataPointSelector));

        registry
    }

    /// Register a stage under its own kind, replacing any previous entry.
    pub fn register(&mut self, stage: Arc<dyn Stage>) -> &mut Self {
        self.stages.insert(stage.kind(), stage);
        self
    }

    /// Get the stage registered for a kind.
    pub fn get(&self, kind: StageKind) -> Result<Arc<dyn Stage>> {
        self.stages
            .get(&kind)
            .cloned()
            .ok_or(CurationError::UnregisteredStage(kind))
    }

    /// Whether a stage is registered for a kind.
    pub fn contains(&self, kind: StageKind) -> bool {
        self.stages.contains_key(&kind)
    }

    /// Registered kinds, in declaration order.
    pub fn kinds(&self) -> Vec<StageKind> {
        StageKind::ALL
            .iter()
            .copied()
            .filter(|kind| self.contains(*kind))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl std::fmt::Debug for StageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
