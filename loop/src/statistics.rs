use ncs_shared::{norm, Mode, TimeStep, Vector};

/// What happened during one cycle
#[derive(Clone, Debug, PartialEq)]
pub struct CycleStatistics {
    pub time_step: TimeStep,
    pub actual_control_error: Vector,
    pub estimated_control_error: Vector,
    pub actual_stage_cost: f64,
    /// Whether the plant state after this cycle is admissible
    pub admissible: bool,
    pub sensor_sent: bool,
    pub controller_sent: bool,
    pub actuator_sent: bool,
    pub measurement_delays: Vec<TimeStep>,
    pub control_sequence_delays: Vec<TimeStep>,
    pub acknowledgement_delays: Vec<TimeStep>,
    pub applied_input: Vector,
    pub applied_mode: Mode,
    pub discarded_sequences: usize,
    pub measurements_used: usize,
    pub measurements_discarded: usize,
}

/// Aggregate view over all recorded cycles
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatisticsSummary {
    pub cycles: usize,
    pub total_stage_cost: f64,
    pub mean_control_error: f64,
    pub discarded_sequences: usize,
    pub inadmissible_cycles: usize,
    pub sensor_transmissions: usize,
    pub controller_transmissions: usize,
    pub acknowledgements: usize,
}

/// Per-cycle record of a control loop, kept for the whole simulation
#[derive(Clone, Debug, Default)]
pub struct LoopStatistics {
    records: Vec<CycleStatistics>,
}

impl LoopStatistics {
    pub fn with_horizon(horizon: usize) -> Self {
        Self {
            records: Vec::with_capacity(horizon),
        }
    }

    pub fn record(&mut self, statistics: CycleStatistics) {
        self.records.push(statistics);
    }

    pub fn records(&self) -> &[CycleStatistics] {
        &self.records
    }

    pub fn last(&self) -> Option<&CycleStatistics> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn summary(&self) -> StatisticsSummary {
        let mut summary = StatisticsSummary {
            cycles: self.records.len(),
            ..StatisticsSummary::default()
        };
        let mut control_error_sum = 0.0;
        for record in &self.records {
            summary.total_stage_cost += record.actual_stage_cost;
            control_error_sum += norm(&record.actual_control_error);
            summary.discarded_sequences += record.discarded_sequences;
            summary.inadmissible_cycles += usize::from(!record.admissible);
            summary.sensor_transmissions += usize::from(record.sensor_sent);
            summary.controller_transmissions += usize::from(record.controller_sent);
            summary.acknowledgements += usize::from(record.actuator_sent);
        }
        if !self.records.is_empty() {
            summary.mean_control_error = control_error_sum / self.records.len() as f64;
        }
        summary
    }
}
