//! Container resolver: builds docker invocations from config records
//!
//! A [`Container`] binds a container name to the [`Machine`] it lives
//! on. `create` is the involved one: it emits flags in a fixed order so
//! the same record always produces the same command line, encodes
//! environment values, validates port and link shapes, and expands
//! `{{identifier}}` placeholders in the trailing arguments. Everything
//! else maps to one fixed docker invocation.

use regex::Regex;
use serde_json::Value;

use super::machine::Machine;
use super::resolve::{expand_placeholders, AddrResolver};
use crate::command::{CommandBuilder, ExecMode, RunMode};
use crate::config::ContainerConfig;
use crate::error::{DockhandError, Result};
use crate::term;

/// Column sets for `docker ps --format`, keyed by how many 20-character
/// columns fit in the terminal.
const FULL_COLUMNS: [&str; 7] = [
    "Names", "ID", "Image", "Command", "Status", "CreatedAt", "Ports",
];

fn columns_for_budget(budget: usize) -> &'static [&'static str] {
    match budget {
        0 | 1 => &["Names"],
        2 => &["Names", "Status"],
        3 => &["Names", "Image", "Status"],
        4 | 5 => &["Names", "Image", "Command", "Status"],
        6 | 7 => &["Names", "Image", "Command", "Status", "CreatedAt"],
        8 => &["Names", "Image", "Command", "Status", "CreatedAt", "Ports"],
        _ => &FULL_COLUMNS,
    }
}

fn make_table(columns: &[&str]) -> String {
    let cells: Vec<String> = columns
        .iter()
        .map(|name| format!("{{{{.{}}}}}", name))
        .collect();
    format!("table {}", cells.join("\t"))
}

/// A named container bound to a machine.
#[derive(Debug, Clone)]
pub struct Container {
    name: String,
    machine: Machine,
}

impl Container {
    pub fn new(name: impl Into<String>, machine: Machine) -> Self {
        Self {
            name: name.into(),
            machine,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    /// Build and run the creation command for this container.
    /// `run == true` uses `docker run --detach`, otherwise `docker
    /// create` (started later with `start`).
    pub fn create(&self, exec: ExecMode, config: &ContainerConfig, run: bool) -> Result<String> {
        let resolver = DockerResolver {
            machine: &self.machine,
            exec,
        };
        let command = self.build_create(&resolver, config, run)?;
        command.run(exec, RunMode::Capture)
    }

    /// Assemble the creation command. Flag order is fixed so repeated
    /// builds from the same record are token-for-token identical.
    pub fn build_create(
        &self,
        resolver: &dyn AddrResolver,
        config: &ContainerConfig,
        run: bool,
    ) -> Result<CommandBuilder> {
        let mut command = base_command();
        if run {
            command.args(["run", "--detach"]);
        } else {
            command.arg("create");
        }
        command.args(["--name", self.name.as_str()]);
        if config.tty {
            command.arg("--tty");
        }
        if config.interactive {
            command.arg("--interactive");
        }
        if config.privileged {
            command.arg("--privileged");
        }
        if let Some(user) = &config.user {
            command.args(["--user", user.as_str()]);
        }
        for capability in &config.capabilities {
            command.args(["--cap-add", capability.as_str()]);
        }
        if let Some(device) = &config.device {
            command.args(["--device", device.as_str()]);
        }
        for (key, value) in &config.environment {
            command.args(["--env".to_string(), format!("{}={}", key, encode_env_value(value))]);
        }
        for port in &config.expose {
            command.args(["--expose", port.as_str()]);
        }
        for link in &config.links {
            if !pair_pattern().is_match(link) {
                return Err(DockhandError::InvalidInput(format!(
                    "In {}, the link \"{}\" does not contain both a container name \
                     and an alias. Example = name:alias",
                    self.name, link
                )));
            }
            command.args(["--link", link.as_str()]);
        }
        if let Some(net) = &config.net {
            command.args(["--net", net.as_str()]);
        }
        if !config.ports.is_empty() {
            let machine_ip = resolver.bound_machine_ip();
            for port in &config.ports {
                let mapping = self.complete_port(port, machine_ip.as_deref())?;
                command.args(["-p".to_string(), mapping]);
            }
        }
        if config.restart {
            command.args(["--restart", "always"]);
        }
        for volume in &config.volumes {
            command.args(["--volume", volume.as_str()]);
        }
        for volume in &config.volumes_from {
            command.args(["--volumes-from", volume.as_str()]);
        }
        command.arg(config.image.as_str());
        for template in &config.command {
            command.arg(expand_placeholders(template, resolver));
        }
        Ok(command)
    }

    /// Validate one port mapping. `internal:external` passes through;
    /// the external-only `:PORT` form is completed with the machine IP
    /// when one is available; anything without a colon pair is fatal.
    fn complete_port(&self, port: &str, machine_ip: Option<&str>) -> Result<String> {
        let external_only = port.starts_with(':') && port.len() > 1;
        if !external_only && !pair_pattern().is_match(port) {
            return Err(DockhandError::InvalidInput(format!(
                "In {}, the port \"{}\" does not contain both internal and \
                 external port.",
                self.name, port
            )));
        }
        if external_only {
            if let Some(ip) = machine_ip.filter(|ip| !ip.is_empty()) {
                return Ok(format!("{}{}", ip, port));
            }
        }
        Ok(port.to_string())
    }

    /// `docker inspect -f {{.State.Running}}` == "true".
    pub fn is_running(&self, exec: ExecMode) -> Result<bool> {
        let running = base_command()
            .args(["inspect", "-f", "{{.State.Running}}", self.name.as_str()])
            .run(exec, RunMode::Capture)?;
        Ok(running == "true")
    }

    /// Interactive shell inside the container; hands over the terminal.
    pub fn shell(&self, exec: ExecMode, shell: &str) -> Result<String> {
        base_command()
            .args(["exec", "-it", self.name.as_str(), shell])
            .run(exec, RunMode::Foreground)
    }

    /// The container's IP on the docker network.
    pub fn ip(&self, exec: ExecMode) -> Result<String> {
        base_command()
            .args(["inspect", "--format", "{{.NetworkSettings.IPAddress}}", self.name.as_str()])
            .run(exec, RunMode::Capture)
    }

    /// `docker rm`, optionally stopping a running container first.
    pub fn remove(&self, exec: ExecMode, stop_if_running: bool) -> Result<String> {
        if stop_if_running && self.is_running(exec)? {
            self.stop(exec)?;
        }
        base_command().args(["rm", self.name.as_str()]).run(exec, RunMode::Capture)
    }

    pub fn stop(&self, exec: ExecMode) -> Result<String> {
        base_command().args(["stop", self.name.as_str()]).run(exec, RunMode::Capture)
    }

    pub fn kill(&self, exec: ExecMode) -> Result<String> {
        base_command().args(["kill", self.name.as_str()]).run(exec, RunMode::Capture)
    }

    pub fn start(&self, exec: ExecMode) -> Result<String> {
        base_command().args(["start", self.name.as_str()]).run(exec, RunMode::Capture)
    }

    /// Follow this container's logs; hands over the terminal.
    pub fn logs(&self, exec: ExecMode, tail: u32) -> Result<String> {
        base_command()
            .args(["logs", "--follow", "--tail"])
            .arg(tail.to_string())
            .arg(self.name.as_str())
            .run(exec, RunMode::Foreground)
    }
}

/// `docker ps --all` with a column set sized to the terminal width.
pub fn processes(exec: ExecMode) -> Result<String> {
    let table = match term::size() {
        Some((_rows, columns)) => make_table(columns_for_budget(columns as usize / 20)),
        None => make_table(&FULL_COLUMNS),
    };
    base_command()
        .args(["ps", "--all", "--format"])
        .arg(table)
        .run(exec, RunMode::Capture)
}

/// `docker images`.
pub fn images(exec: ExecMode) -> Result<String> {
    base_command().arg("images").run(exec, RunMode::Capture)
}

fn base_command() -> CommandBuilder {
    CommandBuilder::new("docker")
}

fn pair_pattern() -> Regex {
    Regex::new(r".+:.+").unwrap()
}

/// Boolean values render as literal `true`/`false`, strings render bare,
/// structured values as compact JSON.
fn encode_env_value(value: &Value) -> String {
    match value {
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => "false".to_string(),
        Value::String(text) => text.clone(),
        Value::Array(_) | Value::Object(_) => {
            serde_json::to_string(value).unwrap_or_default()
        }
        other => other.to_string(),
    }
}

/// Production address lookups: machine IPs via docker-machine, sibling
/// container IPs via docker inspect on the bound machine.
pub struct DockerResolver<'a> {
    pub machine: &'a Machine,
    pub exec: ExecMode,
}

impl AddrResolver for DockerResolver<'_> {
    fn bound_machine_ip(&self) -> Option<String> {
        self.machine.resolve_ip(self.exec)
    }

    fn machine_ip(&self, name: &str) -> Option<String> {
        eprintln!("Looking for machine with name {}", name);
        Machine::named(name).resolve_ip(self.exec)
    }

    fn sibling_container_ip(&self, name: &str) -> Option<String> {
        eprintln!("Looking for neighboring container with name {}", name);
        Container::new(name, self.machine.clone())
            .ip(self.exec)
            .ok()
            .filter(|ip| !ip.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docker::resolve::tests::StubResolver;

    fn config(body: serde_json::Value) -> ContainerConfig {
        let mut full = serde_json::json!({
            "name": "Test",
            "description": "Test record",
            "image": "busybox"
        });
        full.as_object_mut()
            .unwrap()
            .extend(body.as_object().unwrap().clone());
        serde_json::from_value(full).unwrap()
    }

    fn container() -> Container {
        Container::new("web", Machine::local())
    }

    #[test]
    fn test_minimal_run_command() {
        let command = container()
            .build_create(&StubResolver::default(), &config(serde_json::json!({})), true)
            .unwrap();
        assert_eq!(
            command.tokens(),
            &["docker", "run", "--detach", "--name", "web", "busybox"]
        );
    }

    #[test]
    fn test_create_without_run_or_detach() {
        let command = container()
            .build_create(&StubResolver::default(), &config(serde_json::json!({})), false)
            .unwrap();
        assert_eq!(command.tokens(), &["docker", "create", "--name", "web", "busybox"]);
    }

    #[test]
    fn test_flag_order_is_deterministic() {
        let record = config(serde_json::json!({
            "tty": true,
            "interactive": true,
            "privileged": true,
            "user": "www-data",
            "capabilities": ["NET_ADMIN", "SYS_TIME"],
            "device": "/dev/snd",
            "environment": {"B": "2", "A": "1"},
            "expose": ["9000"],
            "links": ["db:db"],
            "net": "host",
            "restart": true,
            "volumes": ["/data:/data"],
            "volumes_from": ["seed"]
        }));
        let first = container()
            .build_create(&StubResolver::default(), &record, true)
            .unwrap();
        let second = container()
            .build_create(&StubResolver::default(), &record, true)
            .unwrap();
        assert_eq!(first.tokens(), second.tokens());
        assert_eq!(
            first.tokens(),
            &[
                "docker", "run", "--detach", "--name", "web", "--tty", "--interactive",
                "--privileged", "--user", "www-data", "--cap-add", "NET_ADMIN", "--cap-add",
                "SYS_TIME", "--device", "/dev/snd", "--env", "A=1", "--env", "B=2",
                "--expose", "9000", "--link", "db:db", "--net", "host", "--restart",
                "always", "--volume", "/data:/data", "--volumes-from", "seed", "busybox",
            ]
        );
    }

    #[test]
    fn test_environment_value_encoding() {
        let record = config(serde_json::json!({
            "environment": {
                "DEBUG": true,
                "CACHE": false,
                "WORKERS": 4,
                "NAME": "plain text",
                "LIST": [1, 2],
                "MAP": {"a": 1}
            }
        }));
        let command = container()
            .build_create(&StubResolver::default(), &record, true)
            .unwrap();
        let tokens = command.tokens();
        assert!(tokens.contains(&"CACHE=false".to_string()));
        assert!(tokens.contains(&"DEBUG=true".to_string()));
        assert!(tokens.contains(&"LIST=[1,2]".to_string()));
        assert!(tokens.contains(&"MAP={\"a\":1}".to_string()));
        assert!(tokens.contains(&"NAME=plain text".to_string()));
        assert!(tokens.contains(&"WORKERS=4".to_string()));
    }

    #[test]
    fn test_port_without_colon_is_fatal() {
        let record = config(serde_json::json!({"ports": ["8080"]}));
        let err = container()
            .build_create(&StubResolver::default(), &record, true)
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("web"));
        assert!(message.contains("\"8080\""));
        assert!(message.contains("internal and external"));
    }

    #[test]
    fn test_external_only_port_completed_with_machine_ip() {
        let resolver = StubResolver {
            bound: Some("10.0.0.5".into()),
            ..Default::default()
        };
        let record = config(serde_json::json!({"ports": [":8080", "80:80"]}));
        let command = container().build_create(&resolver, &record, true).unwrap();
        let tokens = command.tokens();
        assert!(tokens.contains(&"10.0.0.5:8080".to_string()));
        assert!(tokens.contains(&"80:80".to_string()));
    }

    #[test]
    fn test_external_only_port_passes_through_without_ip() {
        let record = config(serde_json::json!({"ports": [":8080"]}));
        let command = container()
            .build_create(&StubResolver::default(), &record, true)
            .unwrap();
        assert!(command.tokens().contains(&":8080".to_string()));
    }

    #[test]
    fn test_bad_link_is_fatal() {
        let record = config(serde_json::json!({"links": ["db"]}));
        let err = container()
            .build_create(&StubResolver::default(), &record, true)
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("\"db\""));
        assert!(message.contains("name:alias"));
    }

    #[test]
    fn test_command_templates_resolve_placeholders() {
        let resolver = StubResolver {
            bound: Some("10.0.0.5".into()),
            ..Default::default()
        };
        let record = config(serde_json::json!({
            "command": ["--advertise", "{{machine}}:8500", "--join", "{{missing}}"]
        }));
        let command = container().build_create(&resolver, &record, true).unwrap();
        let tokens = command.tokens();
        assert!(tokens.contains(&"10.0.0.5:8500".to_string()));
        // Unresolvable targets fall back to loopback instead of failing.
        assert!(tokens.contains(&"127.0.0.1".to_string()));
    }

    #[test]
    fn test_fixed_operation_shapes() {
        let c = container();
        assert_eq!(
            c.ip(ExecMode::DryRun).unwrap(),
            "$(docker inspect --format {{.NetworkSettings.IPAddress}} web)"
        );
        assert_eq!(c.stop(ExecMode::DryRun).unwrap(), "$(docker stop web)");
        assert_eq!(c.kill(ExecMode::DryRun).unwrap(), "$(docker kill web)");
        assert_eq!(c.start(ExecMode::DryRun).unwrap(), "$(docker start web)");
        assert_eq!(images(ExecMode::DryRun).unwrap(), "$(docker images)");
    }

    #[test]
    fn test_is_running_in_dry_run_is_false() {
        // The rendered command line never equals "true".
        assert!(!container().is_running(ExecMode::DryRun).unwrap());
    }

    #[test]
    fn test_column_budget_table() {
        assert_eq!(columns_for_budget(0), &["Names"]);
        assert_eq!(columns_for_budget(3), &["Names", "Image", "Status"]);
        assert_eq!(
            columns_for_budget(8),
            &["Names", "Image", "Command", "Status", "CreatedAt", "Ports"]
        );
        assert_eq!(columns_for_budget(12), &FULL_COLUMNS);
    }

    #[test]
    fn test_make_table_format() {
        assert_eq!(
            make_table(&["Names", "Status"]),
            "table {{.Names}}\t{{.Status}}"
        );
    }
}
