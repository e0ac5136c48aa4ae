use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use crate::registry::AgentRegistry;
use crate::spec::AgentSpec;

/// A dangling or circular reference found between agent definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceIssue {
    UnknownTool { agent: String, tool: String },
    UnknownSubAgent { agent: String, sub_agent: String },
    SelfReference { agent: String },
    /// Agents forming a delegation loop, starting and ending at the same name.
    Cycle { path: Vec<String> },
}

impl fmt::Display for ReferenceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceIssue::UnknownTool { agent, tool } => {
                write!(f, "agent `{agent}` uses unknown tool `{tool}`")
            }
            ReferenceIssue::UnknownSubAgent { agent, sub_agent } => {
                write!(f, "agent `{agent}` delegates to unknown agent `{sub_agent}`")
            }
            ReferenceIssue::SelfReference { agent } => {
                write!(f, "agent `{agent}` lists itself as a sub-agent")
            }
            ReferenceIssue::Cycle { path } => {
                write!(f, "delegation cycle: {}", path.join(" -> "))
            }
        }
    }
}

impl AgentRegistry {
    /// Cross-checks loaded agents against each other and against the tool
    /// names the host has registered.
    pub fn check_references<S: AsRef<str>>(&self, known_tools: &[S]) -> Vec<ReferenceIssue> {
        check_references(self.agents(), known_tools)
    }
}

pub fn check_references<'a, S: AsRef<str>>(
    agents: impl IntoIterator<Item = &'a AgentSpec>,
    known_tools: &[S],
) -> Vec<ReferenceIssue> {
    let agents: BTreeMap<&str, &AgentSpec> =
        agents.into_iter().map(|spec| (spec.name(), spec)).collect();
    let tools: BTreeSet<&str> = known_tools.iter().map(AsRef::as_ref).collect();
    let mut issues = Vec::new();

    for (name, spec) in &agents {
        for tool in spec.tools() {
            if !tools.contains(tool.as_str()) {
                issues.push(ReferenceIssue::UnknownTool {
                    agent: (*name).to_string(),
                    tool: tool.clone(),
                });
            }
        }
        for sub_agent in spec.sub_agents() {
            if sub_agent == name {
                issues.push(ReferenceIssue::SelfReference {
                    agent: (*name).to_string(),
                });
            } else if !agents.contains_key(sub_agent.as_str()) {
                issues.push(ReferenceIssue::UnknownSubAgent {
                    agent: (*name).to_string(),
                    sub_agent: sub_agent.clone(),
                });
            }
        }
    }

    issues.extend(find_cycles(&agents));
    issues
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Visiting,
    Done,
}

fn find_cycles(agents: &BTreeMap<&str, &AgentSpec>) -> Vec<ReferenceIssue> {
    let mut marks: BTreeMap<&str, Mark> = BTreeMap::new();
    let mut stack = Vec::new();
    let mut cycles = Vec::new();
    for &name in agents.keys() {
        visit(name, agents, &mut marks, &mut stack, &mut cycles);
    }
    cycles
}

fn visit<'a>(
    name: &'a str,
    agents: &BTreeMap<&'a str, &'a AgentSpec>,
    marks: &mut BTreeMap<&'a str, Mark>,
    stack: &mut Vec<&'a str>,
    cycles: &mut Vec<ReferenceIssue>,
) {
    match marks.get(name) {
        Some(Mark::Done) => return,
        Some(Mark::Visiting) => {
            if let Some(start) = stack.iter().position(|entry| *entry == name) {
                let mut path: Vec<String> =
                    stack[start..].iter().map(|entry| (*entry).to_string()).collect();
                path.push(name.to_string());
                cycles.push(ReferenceIssue::Cycle { path });
            }
            return;
        }
        None => {}
    }

    let Some(spec) = agents.get(name) else {
        return;
    };
    marks.insert(name, Mark::Visiting);
    stack.push(name);
    for sub_agent in spec.sub_agents() {
        // Self references are reported on their own.
        if sub_agent == name {
            continue;
        }
        if let Some((&key, _)) = agents.get_key_value(sub_agent.as_str()) {
            visit(key, agents, marks, stack, cycles);
        }
    }
    stack.pop();
    marks.insert(name, Mark::Done);
}
