//! Per-step results of one plan run, keyed `step_{id}` on the wire.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

use crate::handshake::{AgentResponse, AgentStatus};

/// Per-step agent responses, iterated in ascending step_id.
///
/// Serializes as a JSON object keyed `"step_{id}"`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutputs {
    steps: BTreeMap<u32, AgentResponse>,
}

impl StepOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_for(step_id: u32) -> String {
        format!("step_{step_id}")
    }

    pub fn insert(&mut self, step_id: u32, response: AgentResponse) -> Option<AgentResponse> {
        self.steps.insert(step_id, response)
    }

    pub fn get(&self, step_id: u32) -> Option<&AgentResponse> {
        self.steps.get(&step_id)
    }

    /// Look up by the serialized key, e.g. `"step_0"`.
    pub fn get_key(&self, key: &str) -> Option<&AgentResponse> {
        let id = key.strip_prefix("step_")?.parse::<u32>().ok()?;
        self.get(id)
    }

    pub fn keys(&self) -> Vec<String> {
        self.steps.keys().map(|id| Self::key_for(*id)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &AgentResponse)> {
        self.steps.iter().map(|(id, response)| (*id, response))
    }

    pub fn responses(&self) -> impl Iterator<Item = &AgentResponse> {
        self.steps.values()
    }

    pub fn successes(&self) -> impl Iterator<Item = &AgentResponse> {
        self.steps.values().filter(|r| r.is_success())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl FromIterator<(u32, AgentResponse)> for StepOutputs {
    fn from_iter<T: IntoIterator<Item = (u32, AgentResponse)>>(iter: T) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

impl Serialize for StepOutputs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.steps.len()))?;
        for (id, response) in &self.steps {
            map.serialize_entry(&Self::key_for(*id), response)?;
        }
        map.end()
    }
}

/// Agent name and status for one executed step, in plan order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UsedAgent {
    pub name: String,
    pub status: AgentStatus,
}

/// Everything a plan run produced.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ExecutionReport {
    pub answer_inputs: StepOutputs,
    pub used_agents: Vec<UsedAgent>,
}

impl ExecutionReport {
    /// `agent` is the planned agent name, not whatever the remote echoed back.
    pub fn record(&mut self, step_id: u32, agent: &str, response: AgentResponse) {
        self.used_agents.push(UsedAgent {
            name: agent.to_string(),
            status: response.status(),
        });
        self.answer_inputs.insert(step_id, response);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handshake::{ErrorKind, OutputModel};

    fn ok(name: &str, result: &str) -> AgentResponse {
        AgentResponse::success("r", name, OutputModel::new(result, 0.9))
    }

    #[test]
    fn iterates_in_ascending_step_id() {
        let mut outputs = StepOutputs::new();
        outputs.insert(10, ok("C", "ten"));
        outputs.insert(2, ok("B", "two"));
        outputs.insert(0, ok("A", "zero"));

        let ids: Vec<u32> = outputs.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![0, 2, 10]);
        assert_eq!(outputs.keys(), vec!["step_0", "step_2", "step_10"]);
    }

    #[test]
    fn looks_up_by_key() {
        let outputs: StepOutputs = vec![(3, ok("A", "x"))].into_iter().collect();
        assert!(outputs.get_key("step_3").is_some());
        assert!(outputs.get_key("step_4").is_none());
        assert!(outputs.get_key("3").is_none());
    }

    #[test]
    fn serializes_with_step_keys() {
        let outputs: StepOutputs = vec![(0, ok("A", "x"))].into_iter().collect();
        let value = serde_json::to_value(&outputs).unwrap();
        assert_eq!(value["step_0"]["output"]["result"], "x");
    }

    #[test]
    fn record_tracks_used_agents_in_order() {
        let mut report = ExecutionReport::default();
        report.record(0, "A", ok("A", "x"));
        report.record(
            1,
            "B",
            AgentResponse::error("r", "B", ErrorKind::HttpError, "HTTP 500"),
        );

        assert_eq!(
            report.used_agents,
            vec![
                UsedAgent {
                    name: "A".into(),
                    status: AgentStatus::Success
                },
                UsedAgent {
                    name: "B".into(),
                    status: AgentStatus::Error
                },
            ]
        );
        assert_eq!(report.answer_inputs.len(), 2);
    }
}
