//! Drive the `oapigen` command end to end against temporary directories.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::fs;
use std::path::Path;

use oapigen_cli::output::{MANIFEST_FILENAME, read_manifest};
use oapigen_cli::run;
use oapigen_core::parse_ir;

const PETSTORE_YAML: &str = r##"
openapi: 3.0.3
info:
  title: Petstore
  version: 1.0.0
paths:
  /pets/{id}:
    get:
      operationId: getPet
      tags: [pets]
      parameters:
        - name: id
          in: path
          required: true
          schema:
            type: string
      responses:
        "200":
          description: A pet.
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/Pet"
  /health:
    get:
      operationId: health
      responses:
        "204":
          description: Healthy.
components:
  schemas:
    Pet:
      type: object
      required: [name]
      properties:
        name:
          type: string
        tag:
          type: [string, "null"]
"##;

fn write_spec(dir: &Path) -> String {
    let path = dir.join("petstore.yaml");
    fs::write(&path, PETSTORE_YAML).unwrap();
    path.display().to_string()
}

fn oapigen(args: &[&str]) -> i32 {
    let mut argv = vec!["oapigen".to_string()];
    argv.extend(args.iter().map(ToString::to_string));
    run(argv)
}

#[test]
fn test_gen_typescript_writes_files_and_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(dir.path());
    let out = dir.path().join("sdk-ts");
    let out_arg = out.display().to_string();

    assert_eq!(oapigen(&["gen:ts", "--spec", &spec, "--out", &out_arg]), 0);

    let manifest = read_manifest(&out).unwrap();
    assert!(manifest.files.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(manifest.files.contains(&"models/Pet.ts".to_string()));
    for file in &manifest.files {
        assert!(out.join(file).is_file(), "{file}");
    }
    let pet = fs::read_to_string(out.join("models/Pet.ts")).unwrap();
    assert!(pet.contains("tag?: string | null;"), "{pet}");
    let raw = fs::read_to_string(out.join(MANIFEST_FILENAME)).unwrap();
    assert!(raw.starts_with("{\n  \"files\": [\n"));
    assert!(raw.ends_with("]\n}\n"));
}

#[test]
fn test_regeneration_removes_stale_files() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(dir.path());
    let out = dir.path().join("gen");
    let out_arg = out.display().to_string();

    fs::create_dir_all(out.join("models")).unwrap();
    fs::write(out.join("models/Removed.ts"), "stale").unwrap();
    fs::write(out.join("notes.md"), "mine").unwrap();
    fs::write(
        out.join(MANIFEST_FILENAME),
        "{\"files\": [\"models/Removed.ts\", \"../escape.txt\"]}\n",
    )
    .unwrap();
    fs::write(dir.path().join("escape.txt"), "outside").unwrap();

    assert_eq!(oapigen(&["gen", "--lang", "go", "--spec", &spec, "--out", &out_arg]), 0);

    assert!(!out.join("models").exists());
    assert!(out.join("notes.md").is_file());
    assert!(dir.path().join("escape.txt").is_file());
    assert_eq!(
        read_manifest(&out).unwrap().files,
        ["client.go", "doc.go", "models.go", "operations.go"]
    );
    let operations = fs::read_to_string(out.join("operations.go")).unwrap();
    assert!(operations.contains("func (c *Client) GetPet(id string, query url.Values, headers map[string]string) (Pet, error) {"));
}

#[test]
fn test_out_requires_single_language() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(dir.path());
    let out = dir.path().join("gen").display().to_string();
    assert_eq!(oapigen(&["gen", "--spec", &spec, "--out", &out]), 1);
    assert_eq!(oapigen(&["gen", "--lang", "ts,go", "--spec", &spec, "--sdk", "x"]), 1);
    assert!(!dir.path().join("gen").exists());
}

#[test]
fn test_unknown_language_fails() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(dir.path());
    let out = dir.path().join("gen").display().to_string();
    assert_eq!(oapigen(&["gen:cobol", "--spec", &spec, "--out", &out]), 1);
    assert!(!dir.path().join("gen").exists());
}

#[test]
fn test_missing_spec_fails() {
    let dir = tempfile::tempdir().unwrap();
    let spec = dir.path().join("absent.json").display().to_string();
    let out = dir.path().join("gen").display().to_string();
    assert_eq!(oapigen(&["gen:go", "--spec", &spec, "--out", &out]), 1);
    assert_eq!(oapigen(&["gen:go", "--out", &out]), 1);
}

#[test]
fn test_malformed_document_aborts_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let spec = dir.path().join("broken.json");
    fs::write(&spec, "{ \"openapi\": \"3.0.3\", \"paths\": ").unwrap();
    let out = dir.path().join("gen");
    let code = oapigen(&[
        "gen:ts",
        "--spec",
        &spec.display().to_string(),
        "--out",
        &out.display().to_string(),
    ]);
    assert_eq!(code, 1);
    assert!(!out.exists());
}

#[test]
fn test_warnings_do_not_fail_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let spec = dir.path().join("loose.json");
    fs::write(
        &spec,
        r#"{
  "openapi": "3.0.3",
  "info": { "title": "Loose", "version": "1" },
  "paths": {
    "/things": {
      "get": {
        "operationId": "listThings",
        "parameters": [ { "name": "q", "in": "query" } ],
        "responses": { "200": { "description": "ok" } }
      }
    }
  }
}"#,
    )
    .unwrap();
    let out = dir.path().join("gen");
    let code = oapigen(&[
        "gen:go",
        "--spec",
        &spec.display().to_string(),
        "--out",
        &out.display().to_string(),
    ]);
    assert_eq!(code, 0);
    assert!(out.join("operations.go").is_file());
}

#[test]
fn test_ir_command_writes_canonical_text() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(dir.path());
    let out = dir.path().join("nested/ir.json");
    let out_arg = out.display().to_string();

    assert_eq!(oapigen(&["ir", "--spec", &spec, "--out", &out_arg, "--default-tag", "misc"]), 0);

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.ends_with("}\n"));
    let ir = parse_ir(&text).unwrap();
    let health = ir
        .operations
        .iter()
        .find(|op| op.operation_id == "health")
        .unwrap();
    assert_eq!(health.tags, ["misc"]);
    assert_eq!(ir.models[0].name, "Pet");
}

#[test]
fn test_config_file_supplies_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(dir.path());
    let config = dir.path().join("oapigen.toml");
    fs::write(&config, "default_tag = \"core\"\n\n[out]\nts = \"sdk/ts\"\n").unwrap();

    assert_eq!(
        oapigen(&["gen:ts", "--spec", &spec, "--config", &config.display().to_string()]),
        0
    );
    let out = dir.path().join("sdk/ts");
    let manifest = read_manifest(&out).unwrap();
    assert!(manifest.files.contains(&"client/core.ts".to_string()), "{manifest:?}");
    assert!(manifest.files.contains(&"client/pets.ts".to_string()), "{manifest:?}");
}
