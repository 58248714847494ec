#![allow(deprecated)] // TODO: move cargo_bin to cargo_bin_cmd!

mod common;

use assert_cmd::Command;
use common::{Workspace, stdout_json};
use predicates::prelude::*;

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("skyforge").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("tier"))
        .stdout(predicate::str::contains("catalog"))
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("apply"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("skyforge").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("skyforge"));
}

#[test]
fn test_invalid_command() {
    let mut cmd = Command::cargo_bin("skyforge").unwrap();
    cmd.arg("invalid-command").assert().failure();
}

#[test]
fn test_unknown_provider_is_a_parse_error() {
    let mut cmd = Command::cargo_bin("skyforge").unwrap();
    cmd.args(["catalog", "--provider", "digitalocean"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("provider"));
}

#[test]
fn test_tier_builds_aws_config() {
    let workspace = Workspace::new();
    let output = workspace
        .command()
        .args(["tier", "-p", "aws", "-t", "large", "-n", "web"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let config = stdout_json(&output);
    assert_eq!(config["instance_type"], "m6i.2xlarge");
    assert_eq!(config["vcpus"], 8);
    assert_eq!(config["memory_gb"], 32);
    assert_eq!(config["name"], "web");
}

#[test]
fn test_tier_uses_configured_region_and_extra_options() {
    let workspace = Workspace::with_settings("providers:\n  gcp:\n    region: europe-west4\n");
    let output = workspace
        .command()
        .args([
            "tier",
            "-p",
            "gcp",
            "-t",
            "small",
            "--profile",
            "compute",
            "-n",
            "worker",
            "--set",
            "preemptible=true",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let config = stdout_json(&output);
    assert_eq!(config["machine_type"], "n2-highcpu-2");
    assert_eq!(config["region"], "europe-west4");
    assert_eq!(config["zone"], "europe-west4-a");
    assert_eq!(config["preemptible"], true);
}

#[test]
fn test_unknown_tier_fails() {
    let workspace = Workspace::new();
    workspace
        .command()
        .args(["tier", "-p", "aws", "-t", "huge", "-n", "web"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("huge"));
}

#[test]
fn test_catalog_for_one_kind() {
    let workspace = Workspace::new();
    let output = workspace
        .command()
        .args(["catalog", "-p", "aws", "-k", "lb"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let spec = stdout_json(&output);
    assert_eq!(spec["mandatory"], serde_json::json!(["lb_type"]));
    assert_eq!(spec["optional"]["health_check_path"], "/health");
}

#[test]
fn test_create_records_audit_event() {
    let workspace = Workspace::new();
    let output = workspace
        .command()
        .args([
            "create",
            "-p",
            "aws",
            "-k",
            "database",
            "-n",
            "orders",
            "--set",
            "engine=postgres",
            "--set",
            "instance_class=db.t3.medium",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let resource = stdout_json(&output);
    assert_eq!(resource["status"], "creating");
    assert_eq!(resource["attributes"]["port"], 5432);
    assert_eq!(resource["attributes"]["allocated_storage"], 20);

    let events = workspace.audit_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["action"], "create");
    assert_eq!(events[0]["actor"], "ci");
    assert_eq!(events[0]["resource_id"], resource["id"]);
    assert_eq!(events[0]["success"], true);
}

#[test]
fn test_create_missing_fields_fails_and_is_audited() {
    let workspace = Workspace::new();
    workspace
        .command()
        .args(["create", "-p", "aws", "-k", "vm", "-n", "web"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("instance_type"));

    let events = workspace.audit_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["success"], false);
}

#[test]
fn test_create_tier_rejects_non_vm_kind() {
    let workspace = Workspace::new();
    workspace
        .command()
        .args(["create", "-p", "aws", "-k", "storage", "-n", "assets", "-t", "small"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("virtual machines"));
}

const MANIFEST: &str = r#"
provider: aws
region: us-west-2
resources:
  - name: web
    kind: vm
    tier: medium
    config:
      security_groups: [sg-0a1b2c3d]
    actions: [stop, start]
    prototype:
      name: base-web
      description: Hardened web server
      tags: { env: prod }
      clones:
        - name: web-2
        - name: web-3
          tags: { env: staging }
  - name: assets
    kind: storage
"#;

#[test]
fn test_apply_manifest() {
    let workspace = Workspace::new();
    let manifest = workspace.write("stack.yaml", MANIFEST);

    let output = workspace
        .command()
        .arg("apply")
        .arg(&manifest)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    let resources = report["resources"].as_array().unwrap();
    assert_eq!(resources.len(), 4);
    assert!(
        resources
            .iter()
            .all(|r| r["attributes"]["deployment_id"] == report["deployment_id"])
    );
    assert!(resources.iter().all(|r| r["region"] == "us-west-2"));

    let web = resources.iter().find(|r| r["name"] == "web").unwrap();
    assert_eq!(web["status"], "running");
    assert_eq!(web["metadata"]["is_template"], true);
    assert_eq!(web["metadata"]["clone_count"], 2);

    let staging = resources.iter().find(|r| r["name"] == "web-3").unwrap();
    assert_eq!(staging["tags"]["env"], "staging");
    assert_eq!(staging["metadata"]["origin_id"], web["id"]);

    assert_eq!(report["prototypes"][0]["usage_count"], 2);
    assert_eq!(report["statistics"]["total_prototypes"], 1);
    assert_eq!(report["statistics"]["total_clones"], 2);

    let actions: Vec<_> = workspace
        .audit_events()
        .iter()
        .map(|event| event["action"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        actions,
        [
            "create",
            "lifecycle",
            "lifecycle",
            "register",
            "clone",
            "clone",
            "create"
        ]
    );
}

#[test]
fn test_apply_invalid_lifecycle_action_fails() {
    let workspace = Workspace::new();
    let manifest = workspace.write(
        "stack.yaml",
        "provider: gcp\nresources:\n  - name: assets\n    kind: storage\n    actions: [stop]\n",
    );

    workspace
        .command()
        .arg("apply")
        .arg(&manifest)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot stop"));

    let events = workspace.audit_events();
    assert_eq!(events.last().unwrap()["success"], false);
}

#[test]
fn test_apply_missing_manifest_fails() {
    let workspace = Workspace::new();
    workspace
        .command()
        .args(["apply", "does-not-exist.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.yaml"));
}

#[test]
fn test_apply_retires_prototype_after_cloning() {
    let workspace = Workspace::new();
    let manifest = workspace.write(
        "stack.yaml",
        r#"
provider: azure
resources:
  - name: edge
    kind: lb
    config: { sku: Standard }
    prototype:
      name: base-edge
      clones:
        - name: edge-2
      retire: true
"#,
    );

    let output = workspace
        .command()
        .arg("apply")
        .arg(&manifest)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert_eq!(report["resources"].as_array().unwrap().len(), 2);
    assert!(report["prototypes"].as_array().unwrap().is_empty());
    assert_eq!(report["statistics"]["total_prototypes"], 0);

    let events = workspace.audit_events();
    let last = events.last().unwrap();
    assert_eq!(last["action"], "delete");
    assert_eq!(last["success"], true);
}
