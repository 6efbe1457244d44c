use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn write_lines(path: &Path, lines: &[&str]) {
    let mut f = fs::File::create(path).unwrap();
    for line in lines {
        writeln!(f, "{}", line).unwrap();
    }
}

fn dump_fixture(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let hash_path = dir.join("ntds.txt");
    let pot_path = dir.join("hashcat.potfile");
    write_lines(
        &hash_path,
        &[
            "DOM\\alice:1001:aad3b435b51404eeaad3b435b51404ee:8846F7EAEE8FB117AD06BDD830B7586C:::",
            "DOM\\alice_history0:1001:aad3b435b51404eeaad3b435b51404ee:bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb:::",
            "DOM\\bob:1002:aad3b435b51404eeaad3b435b51404ee:8846f7eaee8fb117ad06bdd830b7586c:::",
            "DOM\\carol:1003:aad3b435b51404eeaad3b435b51404ee:cccccccccccccccccccccccccccccccc:::",
            "HOST$:1004:aad3b435b51404eeaad3b435b51404ee:dddddddddddddddddddddddddddddddd:::",
        ],
    );
    write_lines(
        &pot_path,
        &[
            "8846f7eaee8fb117ad06bdd830b7586c:Summer2023!",
            "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb:Summer2022!",
        ],
    );
    (hash_path, pot_path)
}

#[test]
fn e2e_runs_and_writes_outputs() {
    let tmp = tempdir().unwrap();
    let (hash_path, pot_path) = dump_fixture(tmp.path());
    let outdir = tmp.path().join("out");

    let mut cmd = Command::cargo_bin("graphcat").unwrap();
    cmd.arg("-H")
        .arg(&hash_path)
        .arg("-p")
        .arg(&pot_path)
        .arg("-o")
        .arg(&outdir)
        .arg("--export-tables")
        .arg("--color")
        .arg("never");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Total hashes submitted: 3"))
        .stdout(predicate::str::contains("Passwords found: 2"))
        .stdout(predicate::str::contains("Summer2023!: 2"))
        .stdout(predicate::str::contains(
            "Users with similar password pattern along history: 1",
        ));

    let files: Vec<_> = fs::read_dir(&outdir).unwrap().collect();
    assert_eq!(files.len(), 6);
    let user_pass = fs::read_dir(&outdir)
        .unwrap()
        .filter_map(|e| e.ok())
        .find(|e| e.file_name().to_string_lossy().starts_with("graphcat_user_pass_"))
        .unwrap();
    let txt = fs::read_to_string(user_pass.path()).unwrap();
    assert_eq!(txt, "DOM\\alice:Summer2023!\nDOM\\bob:Summer2023!\n");
}

#[test]
fn parallel_and_mmap_produce_the_same_report() {
    let tmp = tempdir().unwrap();
    let (hash_path, pot_path) = dump_fixture(tmp.path());

    let run = |extra: &[&str]| {
        let mut cmd = Command::cargo_bin("graphcat").unwrap();
        cmd.arg("-H")
            .arg(&hash_path)
            .arg("-p")
            .arg(&pot_path)
            .arg("--color")
            .arg("never")
            .args(extra);
        let out = cmd.output().unwrap();
        assert!(out.status.success());
        String::from_utf8(out.stdout).unwrap()
    };
    let sequential = run(&[]);
    let parallel = run(&["--parallel", "--mmap-threshold", "32"]);
    assert_eq!(sequential, parallel);
}

#[test]
fn user_hash_format_without_history_omits_history_section() {
    let tmp = tempdir().unwrap();
    let hash_path = tmp.path().join("hashes.txt");
    let pot_path = tmp.path().join("john.pot");
    write_lines(&hash_path, &["alice:AAAA", "bob:aaaa", "carol:bbbb"]);
    write_lines(&pot_path, &["$NT$aaaa:letmein", "bbbb:ignored"]);

    let mut cmd = Command::cargo_bin("graphcat").unwrap();
    cmd.arg("-H")
        .arg(&hash_path)
        .arg("-p")
        .arg(&pot_path)
        .arg("-f")
        .arg("2")
        .arg("--john")
        .arg("--color")
        .arg("never");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Passwords found: 2"))
        .stdout(predicate::str::contains("letmein: 2"))
        .stdout(predicate::str::contains("Password History").not());
}

#[test]
fn missing_hash_file_causes_non_zero_exit() {
    let tmp = tempdir().unwrap();
    let pot_path = tmp.path().join("hashcat.potfile");
    write_lines(&pot_path, &["aaaa:pw"]);
    let mut cmd = Command::cargo_bin("graphcat").unwrap();
    cmd.arg("-H")
        .arg(tmp.path().join("missing.txt"))
        .arg("-p")
        .arg(&pot_path);
    cmd.assert().failure().code(2);
}

#[test]
fn unknown_format_and_empty_potfile_are_configuration_failures() {
    let tmp = tempdir().unwrap();
    let (hash_path, pot_path) = dump_fixture(tmp.path());
    let mut cmd = Command::cargo_bin("graphcat").unwrap();
    cmd.arg("-H")
        .arg(&hash_path)
        .arg("-p")
        .arg(&pot_path)
        .arg("-f")
        .arg("9");
    cmd.assert().failure().code(3);

    let empty_pot = tmp.path().join("empty.potfile");
    fs::write(&empty_pot, b"").unwrap();
    let mut cmd = Command::cargo_bin("graphcat").unwrap();
    cmd.arg("-H").arg(&hash_path).arg("-p").arg(&empty_pot);
    cmd.assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("no entry in potfile"));
}

#[test]
fn nothing_cracked_exits_cleanly_without_report() {
    let tmp = tempdir().unwrap();
    let hash_path = tmp.path().join("hashes.txt");
    let pot_path = tmp.path().join("hashcat.potfile");
    write_lines(&hash_path, &["aaaa", "bbbb"]);
    write_lines(&pot_path, &["cccc:pw"]);
    let mut cmd = Command::cargo_bin("graphcat").unwrap();
    cmd.arg("-H")
        .arg(&hash_path)
        .arg("-p")
        .arg(&pot_path)
        .arg("-f")
        .arg("1");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Password Cracking Report").not());
}

#[test]
fn export_failure_causes_non_zero_exit() {
    let tmp = tempdir().unwrap();
    let (hash_path, pot_path) = dump_fixture(tmp.path());
    let outdir = tmp.path().join("out");
    // A file where the output directory should be makes create_dir_all fail
    fs::write(&outdir, b"not a dir").unwrap();
    let mut cmd = Command::cargo_bin("graphcat").unwrap();
    cmd.arg("-H")
        .arg(&hash_path)
        .arg("-p")
        .arg(&pot_path)
        .arg("-o")
        .arg(&outdir)
        .arg("-q");
    cmd.assert().failure().code(4);
}
