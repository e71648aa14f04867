//! Integration tests for the b1assist binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const KEY_VARS: &[&str] = &[
    "GOOGLE_GEOCODE_API_KEY",
    "CNPJA_API_KEY_COMERCIAL",
    "CNPJA_API_URL_COMERCIAL_IE_SIMPLES",
    "API_CNPJ_SELECIONADA",
    "DEFAULT_IMAGE_CONFIDENCE",
];

fn b1assist(project: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("b1assist"));
    cmd.current_dir(project.path()).arg("--non-interactive");
    for var in KEY_VARS {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("b1assist"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("business partner registration"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("b1assist"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_rejects_unknown_subcommand() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("b1assist"));
    cmd.arg("frobnicate");
    cmd.assert().failure();
    Ok(())
}

#[test]
fn session_reset_then_show() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    fs::create_dir_all(temp.path().join("temp"))?;
    fs::write(
        temp.path().join("temp/dados_sessao.json"),
        r#"{"razao_social": "ACME LTDA"}"#,
    )?;

    b1assist(&temp)
        .args(["session", "reset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Session reset"));

    b1assist(&temp)
        .args(["session", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"razao_social\": \"\""))
        .stdout(predicate::str::contains("ACME").not());
    Ok(())
}

#[test]
fn sync_builds_manifest_from_images() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    fs::create_dir_all(temp.path().join("imagens"))?;
    fs::write(temp.path().join("imagens/aba_geral.png"), b"png")?;

    b1assist(&temp)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("+ aba_geral"));

    let manifest = fs::read_to_string(temp.path().join("parametros.json"))?;
    assert!(manifest.contains("imagens/aba_geral.png"));
    Ok(())
}

#[test]
fn project_flag_points_at_another_directory() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let elsewhere = TempDir::new()?;
    fs::create_dir_all(elsewhere.path().join("imagens"))?;
    fs::write(elsewhere.path().join("imagens/aba_socio.png"), b"png")?;

    b1assist(&temp)
        .arg("--project")
        .arg(elsewhere.path())
        .arg("sync")
        .assert()
        .success();

    assert!(elsewhere.path().join("parametros.json").exists());
    assert!(!temp.path().join("parametros.json").exists());
    Ok(())
}

#[test]
fn run_without_keys_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;

    b1assist(&temp)
        .arg("run")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("GOOGLE_GEOCODE_API_KEY"));
    Ok(())
}

#[test]
fn invalid_config_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    fs::write(temp.path().join("b1assist.yml"), "image_confidence: 1.5\n")?;

    b1assist(&temp)
        .args(["session", "show"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("image_confidence"));
    Ok(())
}

#[test]
fn lookup_rejects_cpf() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    fs::write(temp.path().join(".env"), "CNPJA_API_KEY_COMERCIAL=abc\n")?;

    b1assist(&temp)
        .args(["lookup", "123.456.789-01"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not a CNPJ"));
    Ok(())
}
