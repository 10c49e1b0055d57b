use std::io::Write;

use assert_cmd::Command;
use httpmock::prelude::*;

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>group activity</title>
  <id>https://gitlab.example.com/group.atom</id>
  <updated>2025-03-01T12:00:00Z</updated>
  <entry>
    <id>tag:gitlab.example.com,2025-03-01:2</id>
    <title>Bob opened issue #42: Fix crash at group/project</title>
    <updated>2025-03-01T11:59:00Z</updated>
    <author><name>Bob</name></author>
  </entry>
  <entry>
    <id>tag:gitlab.example.com,2025-03-01:1</id>
    <title>Alice pushed to main at group/project</title>
    <updated>2025-03-01T11:58:00Z</updated>
    <author><name>Alice</name></author>
    <summary type="html">&lt;div class="blockquote"&gt;&lt;p&gt;Fix the build&lt;/p&gt;&lt;/div&gt;&lt;a href="/c/a1b2c3"&gt;a1b2c3&lt;/a&gt;</summary>
  </entry>
</feed>"#;

fn kiosk() -> Command {
    let mut cmd = Command::cargo_bin("gitlab-kiosk").unwrap();
    cmd.env_remove("GITLAB_FEED_URL").env_remove("KIOSK_CONFIG");
    cmd
}

#[test]
fn once_prints_classified_activity() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/dashboard/projects.atom");
        then.status(200)
            .header("content-type", "application/atom+xml")
            .body(FEED);
    });

    let output = kiosk()
        .args(["--once", "--feed-url", &server.url("/dashboard/projects.atom")])
        .output()
        .unwrap();

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    let bob = stdout.find("Bob opened issue #42").expect(&stdout);
    let alice = stdout.find("Alice pushed to main").expect(&stdout);
    assert!(bob < alice, "feed order is kept");
    assert!(stdout.contains("Fix crash"));
    assert!(stdout.contains("Fix the build a1b2c3"));
    assert!(stdout.contains("group/project"));
}

#[test]
fn once_reports_outage_on_503() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/feed.atom");
        then.status(503);
    });

    let output = kiosk()
        .args(["--once", "--feed-url", &server.url("/feed.atom")])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("unavailable since now"), "{stderr}");
    assert!(stderr.contains("503"), "{stderr}");
}

#[test]
fn once_reports_malformed_feed() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/feed.atom");
        then.status(200).body("<html><body>login required</body></html>");
    });

    let output = kiosk()
        .args(["--once", "--feed-url", &server.url("/feed.atom")])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("malformed feed"), "{stderr}");
}

#[test]
fn feed_url_can_come_from_config_file() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/from-config.atom");
        then.status(200).body(FEED);
    });

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"gitlabFeedUrl": "{}", "detailMaxChars": 80}}"#,
        server.url("/from-config.atom")
    )
    .unwrap();

    kiosk()
        .args(["--once", "--config"])
        .arg(file.path())
        .assert()
        .success();

    mock.assert();
}

#[test]
fn missing_feed_url_fails_with_hint() {
    let dir = tempfile::tempdir().unwrap();

    let output = kiosk()
        .current_dir(dir.path())
        .arg("--once")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("no feed URL configured"), "{stderr}");
}
