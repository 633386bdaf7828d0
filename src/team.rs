//! Declarative agent hierarchies.
//!
//! A team is a set of [`AgentSpec`]s from configuration where each agent may
//! consult others by name. The consult graph is checked before anything is
//! built: unknown references are configuration errors; cycles and chains
//! longer than `team.max_depth` are composition errors. Agents are then
//! built leaves first so every consulted agent exists before its parent.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::info;

use crate::agent::{Agent, AgentBuilder};
use crate::config::credentials::CredentialLookup;
use crate::config::{AgentSpec, Config, TeamConfig};
use crate::error::{HermesError, Result};
use crate::providers::ProviderRegistry;

/// Agents built from configuration, by name.
#[derive(Debug, Clone, Default)]
pub struct Team {
    agents: BTreeMap<String, Arc<Agent>>,
}

impl Team {
    /// Look up an agent, failing with a configuration error if absent.
    pub fn get(&self, name: &str) -> Result<Arc<Agent>> {
        self.agents.get(name).cloned().ok_or_else(|| {
            HermesError::Config(format!(
                "Unknown agent '{}'. Configured agents: {}",
                name,
                self.names().join(", ")
            ))
        })
    }

    /// Agent names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.agents.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Arc<Agent>)> {
        self.agents.iter()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

/// Check the consult graph and return a build order with every agent after
/// the agents it consults.
///
/// # Example
/// ```
/// use hermes::config::{AgentSpec, TeamConfig};
/// use hermes::team::build_order;
///
/// let team = TeamConfig {
///     max_depth: 8,
///     agents: vec![
///         AgentSpec { name: "Coordinator".into(), consults: vec!["Analyst".into()], ..Default::default() },
///         AgentSpec { name: "Analyst".into(), ..Default::default() },
///     ],
/// };
/// assert_eq!(build_order(&team).unwrap(), vec!["Analyst", "Coordinator"]);
/// ```
pub fn build_order(team: &TeamConfig) -> Result<Vec<String>> {
    let mut specs: HashMap<&str, &AgentSpec> = HashMap::new();
    for spec in &team.agents {
        if spec.name.trim().is_empty() {
            return Err(HermesError::Config("Team agent with empty name".into()));
        }
        if specs.insert(spec.name.as_str(), spec).is_some() {
            return Err(HermesError::Config(format!(
                "Duplicate agent name in team: '{}'",
                spec.name
            )));
        }
    }

    for spec in &team.agents {
        for target in &spec.consults {
            if !specs.contains_key(target.as_str()) {
                return Err(HermesError::Config(format!(
                    "Agent '{}' consults unknown agent '{}'",
                    spec.name, target
                )));
            }
        }
    }

    fn visit<'a>(
        name: &'a str,
        specs: &HashMap<&'a str, &'a AgentSpec>,
        state: &mut HashMap<&'a str, Visit>,
        depth: &mut HashMap<&'a str, usize>,
        path: &mut Vec<&'a str>,
        order: &mut Vec<String>,
    ) -> Result<usize> {
        match state.get(name) {
            Some(Visit::Done) => return Ok(depth.get(name).copied().unwrap_or(1)),
            Some(Visit::InProgress) => {
                let start = path.iter().position(|n| *n == name).unwrap_or(0);
                let mut cycle: Vec<&str> = path[start..].to_vec();
                cycle.push(name);
                return Err(HermesError::Composition(format!(
                    "Agent cycle detected: {}",
                    cycle.join(" -> ")
                )));
            }
            None => {}
        }

        state.insert(name, Visit::InProgress);
        path.push(name);

        let mut deepest = 0;
        if let Some(&spec) = specs.get(name) {
            for target in &spec.consults {
                let d = visit(target.as_str(), specs, state, depth, path, order)?;
                deepest = deepest.max(d);
            }
        }

        path.pop();
        state.insert(name, Visit::Done);
        depth.insert(name, deepest + 1);
        order.push(name.to_string());
        Ok(deepest + 1)
    }

    let mut state = HashMap::new();
    let mut depth = HashMap::new();
    let mut order = Vec::with_capacity(team.agents.len());
    for spec in &team.agents {
        let mut path = Vec::new();
        let d = visit(
            spec.name.as_str(),
            &specs,
            &mut state,
            &mut depth,
            &mut path,
            &mut order,
        )?;
        if d > team.max_depth {
            return Err(HermesError::Composition(format!(
                "Agent '{}' has a consult chain of {} agents, exceeding max depth {}",
                spec.name, d, team.max_depth
            )));
        }
    }

    Ok(order)
}

/// Build every agent in `config.team`.
///
/// Per-agent settings fall back to `agents.defaults`; credentials fall back
/// to `credentials` when a spec has no `api_key`.
pub fn build_team(
    config: &Config,
    providers: &ProviderRegistry,
    credentials: &dyn CredentialLookup,
) -> Result<Team> {
    let order = build_order(&config.team)?;
    let specs: HashMap<&str, &AgentSpec> = config
        .team
        .agents
        .iter()
        .map(|spec| (spec.name.as_str(), spec))
        .collect();

    let mut agents: BTreeMap<String, Arc<Agent>> = BTreeMap::new();
    for name in &order {
        let spec = specs
            .get(name.as_str())
            .ok_or_else(|| HermesError::Config(format!("Unknown agent '{}'", name)))?;
        let agent = builder_for(spec, config, providers, credentials, &agents)?.build()?;
        agents.insert(name.clone(), agent);
    }

    info!(agents = agents.len(), "Team built");
    Ok(Team { agents })
}

fn builder_for(
    spec: &AgentSpec,
    config: &Config,
    providers: &ProviderRegistry,
    credentials: &dyn CredentialLookup,
    built: &BTreeMap<String, Arc<Agent>>,
) -> Result<AgentBuilder> {
    let defaults = &config.agents.defaults;
    let provider = spec.provider.as_deref().unwrap_or(&defaults.provider);

    let api_key = spec
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| credentials.lookup(provider))
        .unwrap_or_default();

    let mut builder = AgentBuilder::from_defaults(&spec.name, defaults)
        .description(&spec.description)
        .prompt(&spec.prompt)
        .provider(provider)
        .api_key(&api_key)
        .api_base(config.providers.api_base(provider))
        .providers(providers.clone())
        .max_depth(config.team.max_depth);

    if let Some(model) = &spec.model {
        builder = builder.model(model);
    }
    if let Some(temperature) = spec.temperature {
        builder = builder.temperature(temperature);
    }
    if let Some(n) = spec.max_history_length {
        builder = builder.max_history_length(n);
    }
    if let Some(limit) = spec.token_limit {
        builder = builder.token_limit(limit);
    }

    for target in &spec.consults {
        let child = built.get(target).ok_or_else(|| {
            HermesError::Config(format!(
                "Agent '{}' consults unknown agent '{}'",
                spec.name, target
            ))
        })?;
        builder = builder.tool(Arc::clone(child));
    }

    Ok(builder)
}
