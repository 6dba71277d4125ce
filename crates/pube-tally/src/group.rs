use serde::{Deserialize, Serialize};

/// Named energy group assigned to a tally bin by its position.
///
/// The mapping is positional: the aggregator trusts the engine to return
/// bins in the order of the energy filter edges it was configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnergyGroup {
    /// Below 0.025 eV.
    Thermal,
    /// 0.025 eV to 0.5 eV.
    Epithermal,
    /// 0.5 eV to 100 keV.
    Intermediate,
    /// Above 100 keV.
    Fast,
    /// Any bin past the fourth.
    Other,
}

impl EnergyGroup {
    /// Group for the bin at `index`.
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => EnergyGroup::Thermal,
            1 => EnergyGroup::Epithermal,
            2 => EnergyGroup::Intermediate,
            3 => EnergyGroup::Fast,
            _ => EnergyGroup::Other,
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            EnergyGroup::Thermal => "Thermal",
            EnergyGroup::Epithermal => "Epithermal",
            EnergyGroup::Intermediate => "Intermediate",
            EnergyGroup::Fast => "Fast",
            EnergyGroup::Other => "Other",
        }
    }

    /// Nominal energy range; `--` for [`EnergyGroup::Other`].
    pub fn range(self) -> &'static str {
        match self {
            EnergyGroup::Thermal => "< 0.025 eV",
            EnergyGroup::Epithermal => "0.025-0.5 eV",
            EnergyGroup::Intermediate => "0.5 eV-100 keV",
            EnergyGroup::Fast => "> 100 keV",
            EnergyGroup::Other => "--",
        }
    }
}

/// Raw estimator statistics for one energy bin, in cm per source particle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TallyBin {
    /// Position in the energy filter.
    pub index: usize,
    /// Group derived from `index`.
    pub group: EnergyGroup,
    /// Lower filter edge in eV, when the artefact reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_low_ev: Option<f64>,
    /// Upper filter edge in eV, when the artefact reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_high_ev: Option<f64>,
    /// Estimator mean.
    pub mean: f64,
    /// Estimator standard deviation.
    pub std_dev: f64,
}

impl TallyBin {
    /// Bin at `index` with no energy edges attached.
    pub fn new(index: usize, mean: f64, std_dev: f64) -> Self {
        Self {
            index,
            group: EnergyGroup::from_index(index),
            energy_low_ev: None,
            energy_high_ev: None,
            mean,
            std_dev,
        }
    }

    /// Group label.
    pub fn label(&self) -> &'static str {
        self.group.label()
    }

    /// Nominal range.
    pub fn range(&self) -> &'static str {
        self.group.range()
    }
}
