use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn seed_users(workspace: &Path) {
    let users = json!([
        { "id": "t1", "username": "mr-briggs", "password": "chalkdust", "role": "teacher" },
        { "id": "s1", "username": "ayo", "password": "pencil", "role": "student" },
        { "id": "s2", "username": "bea", "password": "crayon", "role": "student" }
    ]);
    std::fs::create_dir_all(workspace.join("data")).expect("create data dir");
    std::fs::write(
        workspace.join("data/users.json"),
        serde_json::to_string_pretty(&users).expect("encode users"),
    )
    .expect("seed users");
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_clubbookd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn clubbookd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("clubbook-router-smoke");
    seed_users(&workspace);
    let bundle_out = workspace.join("smoke-backup.zip");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let teacher = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "auth.login",
        json!({ "username": "mr-briggs", "password": "chalkdust" }),
    );
    let teacher_token = teacher
        .get("token")
        .and_then(|v| v.as_str())
        .expect("teacher token")
        .to_string();

    let student = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "auth.login",
        json!({ "username": "ayo", "password": "pencil" }),
    );
    let student_token = student
        .get("token")
        .and_then(|v| v.as_str())
        .expect("student token")
        .to_string();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "users.list",
        json!({ "token": teacher_token }),
    );

    let created_club = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "clubs.create",
        json!({ "token": teacher_token, "name": "Press" }),
    );
    let club_id = created_club
        .get("club")
        .and_then(|c| c.get("id"))
        .and_then(|v| v.as_i64())
        .expect("club id");

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "clubs.assign",
        json!({ "token": teacher_token, "studentIds": ["s1"], "clubId": club_id }),
    );
    let _ = request_ok(&mut stdin, &mut reader, "8", "clubs.list", json!({ "token": student_token }));
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "chat.post",
        json!({ "token": student_token, "clubId": club_id, "message": "hello club" }),
    );

    let created_assignment = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "assignments.create",
        json!({
            "token": teacher_token,
            "name": "Essay",
            "description": "Two pages on a local story",
            "dueDate": "2024-05-01"
        }),
    );
    let assignment_id = created_assignment
        .get("assignment")
        .and_then(|a| a.get("id"))
        .and_then(|v| v.as_i64())
        .expect("assignment id");

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "assignments.list",
        json!({ "token": student_token }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "12",
        "assignments.submit",
        json!({
            "token": student_token,
            "assignmentId": assignment_id,
            "submissionTime": "2024-04-20T10:00:00Z"
        }),
    );

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "13",
        "questionnaires.submit",
        json!({ "token": student_token, "answers": { "best-subject": "English" } }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "14",
        "questionnaires.list",
        json!({ "token": teacher_token }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "15",
        "dashboard.get",
        json!({ "token": student_token, "studentId": "s1" }),
    );

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "16",
        "backup.exportDataBundle",
        json!({ "token": teacher_token, "outPath": bundle_out.to_string_lossy() }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "17",
        "backup.importDataBundle",
        json!({ "token": teacher_token, "inPath": bundle_out.to_string_lossy() }),
    );

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "18",
        "auth.logout",
        json!({ "token": student_token }),
    );

    let unknown = request(&mut stdin, &mut reader, "19", "clubs.rename", json!({}));
    assert_eq!(
        unknown
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str()),
        Some("not_implemented")
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
