use crate::plan::Plan;
use crate::registry::AgentRegistry;

/// Turns a query into a [`Plan`] over the agents in the registry.
///
/// Implementations are expected to be free of side effects.
pub trait Planner: Send + Sync {
    fn plan(&self, query: &str, registry: &AgentRegistry) -> anyhow::Result<Plan>;
}

/// Planner that hands out the same plan for every query.
#[derive(Debug, Clone, Default)]
pub struct StaticPlanner {
    plan: Plan,
}

impl StaticPlanner {
    pub fn new(plan: Plan) -> Self {
        Self { plan }
    }
}

impl Planner for StaticPlanner {
    fn plan(&self, _query: &str, _registry: &AgentRegistry) -> anyhow::Result<Plan> {
        Ok(self.plan.clone())
    }
}

impl<F> Planner for F
where
    F: Fn(&str, &AgentRegistry) -> anyhow::Result<Plan> + Send + Sync,
{
    fn plan(&self, query: &str, registry: &AgentRegistry) -> anyhow::Result<Plan> {
        self(query, registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{InputSource, PlanStep};

    #[test]
    fn static_planner_ignores_query() {
        let plan = Plan::new(vec![PlanStep::new(
            0,
            "KBAgent",
            "update_wiki",
            InputSource::UserQuery,
        )]);
        let planner = StaticPlanner::new(plan.clone());
        let registry = AgentRegistry::new();

        assert_eq!(planner.plan("a", &registry).unwrap(), plan);
        assert_eq!(planner.plan("b", &registry).unwrap(), plan);
    }

    #[test]
    fn closures_are_planners() {
        let planner = |query: &str, _: &AgentRegistry| -> anyhow::Result<Plan> {
            if query.is_empty() {
                anyhow::bail!("empty query");
            }
            Ok(Plan::empty())
        };
        let registry = AgentRegistry::new();

        assert!(Planner::plan(&planner, "", &registry).is_err());
        assert!(Planner::plan(&planner, "hi", &registry).unwrap().is_empty());
    }
}
