//! Per-kind wiring between CLI arguments, wire specs, and table layouts.

use crate::api::resources::{self, ResourceSpec};
use crate::cli::main_types::Kind;
use crate::display::ColumnSpec;

/// Wire spec for a CLI kind
pub fn resource_spec(kind: Kind) -> ResourceSpec {
    match kind {
        Kind::Cluster => resources::CLUSTERS,
        Kind::Host => resources::HOSTS,
        Kind::Task => resources::TASKS,
        Kind::Taskrun => resources::TASKRUNS,
        Kind::Pipeline => resources::PIPELINES,
        Kind::Pipelinerun => resources::PIPELINERUNS,
        Kind::Eventhook => resources::EVENTHOOKS,
    }
}

/// Singular label for user-facing messages
pub fn kind_label(kind: Kind) -> &'static str {
    match kind {
        Kind::Cluster => "cluster",
        Kind::Host => "host",
        Kind::Task => "task",
        Kind::Taskrun => "taskrun",
        Kind::Pipeline => "pipeline",
        Kind::Pipelinerun => "pipelinerun",
        Kind::Eventhook => "eventhook",
    }
}

/// List-view columns for a kind
pub fn list_columns(kind: Kind) -> &'static [ColumnSpec] {
    match kind {
        Kind::Cluster => CLUSTER_COLUMNS,
        Kind::Host => HOST_COLUMNS,
        Kind::Task => TASK_COLUMNS,
        Kind::Taskrun => TASKRUN_COLUMNS,
        Kind::Pipeline => PIPELINE_COLUMNS,
        Kind::Pipelinerun => PIPELINERUN_COLUMNS,
        Kind::Eventhook => EVENTHOOK_COLUMNS,
    }
}

const CLUSTER_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("Name", "metadata.name"),
    ColumnSpec::new("Server", "spec.server"),
    ColumnSpec::new("Version", "status.version"),
    ColumnSpec::new("Node", "status.node"),
    ColumnSpec::new("Running", "status.runningPod"),
    ColumnSpec::new("TotalPod", "status.pod"),
    ColumnSpec::new("HeartTime", "status.heartTime"),
    // This kind alone serializes the key in lower case
    ColumnSpec::new("HeartStatus", "status.heartstatus"),
];

const HOST_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("Name", "metadata.name"),
    ColumnSpec::new("Address", "spec.address"),
    ColumnSpec::new("Hostname", "status.hostname"),
    ColumnSpec::new("CPU", "status.cpuTotal"),
    ColumnSpec::new("Mem", "status.memTotal"),
    ColumnSpec::new("Disk", "status.diskTotal"),
    ColumnSpec::new("DiskUsage", "status.diskUsagePercent"),
    ColumnSpec::new("HeartTime", "status.heartTime"),
    ColumnSpec::new("HeartStatus", "status.heartStatus"),
];

const TASK_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("Name", "metadata.name"),
    ColumnSpec::new("Crontab", "spec.crontab"),
    ColumnSpec::new("Variables", "spec.variables"),
    ColumnSpec::new("StartTime", "status.startTime"),
    ColumnSpec::new("RunStatus", "status.runStatus"),
];

const TASKRUN_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("Name", "metadata.name"),
    ColumnSpec::new("Ref", "spec.ref"),
    ColumnSpec::new("Crontab", "spec.crontab"),
    ColumnSpec::new("StartTime", "status.startTime"),
    ColumnSpec::new("RunStatus", "status.runStatus"),
];

const PIPELINE_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("Name", "metadata.name"),
    ColumnSpec::new("Desc", "spec.desc"),
    ColumnSpec::new("Crontab", "spec.crontab"),
    ColumnSpec::new("Tasks", "spec.tasks"),
    ColumnSpec::new("Variables", "spec.variables"),
];

const PIPELINERUN_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("Name", "metadata.name"),
    ColumnSpec::new("PipelineRef", "spec.pipelineRef"),
    ColumnSpec::new("Crontab", "spec.crontab"),
    ColumnSpec::new("Desc", "spec.desc"),
    ColumnSpec::new("StartTime", "status.startTime"),
    ColumnSpec::new("RunStatus", "status.runStatus"),
];

const EVENTHOOK_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("Name", "metadata.name"),
    ColumnSpec::new("Subject", "spec.subject"),
    ColumnSpec::new("Type", "spec.type"),
    ColumnSpec::new("URL", "spec.url"),
];

pub const NODE_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("Name", "metadata.name"),
    ColumnSpec::new("Version", "status.nodeInfo.kubeletVersion"),
    ColumnSpec::new("CPU", "status.capacity.cpu"),
    ColumnSpec::memory("Memory", "status.capacity.memory"),
];

// Event records arrive flat: subject, the raw cloudevent, and a
// backend-formatted timestamp
pub const EVENT_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("Subject", "subject"),
    ColumnSpec::new("Event", "event"),
    ColumnSpec::new("Time", "time"),
];
