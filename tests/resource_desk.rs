use anyhow::{anyhow, Result};
use async_trait::async_trait;
use resource_bot::bot::actions::{Action, FileRef};
use resource_bot::bot::handlers::SelectionOutcome;
use resource_bot::bot::transport::ChatTransport;
use resource_bot::bot::views::{DefaultResourceView, MenuOption, ResourceView};
use resource_bot::bot::ResourceDesk;
use resource_bot::catalog::FileCatalog;
use resource_bot::ledger::{DownloadLedger, InMemoryLedger};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Sent {
    Text(String),
    Menu { text: String, options: Vec<MenuOption> },
    Document { file_name: String, content: Vec<u8>, caption: String },
}

#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingTransport {
    fn push(&self, item: Sent) -> Result<()> {
        self.sent
            .lock()
            .map_err(|e| anyhow!(e.to_string()))?
            .push(item);
        Ok(())
    }

    fn take(&self) -> Vec<Sent> {
        self.sent
            .lock()
            .map(|mut sent| std::mem::take(&mut *sent))
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_text(&self, text: &str) -> Result<()> {
        self.push(Sent::Text(text.to_string()))
    }

    async fn send_menu(&self, text: &str, options: &[MenuOption]) -> Result<()> {
        self.push(Sent::Menu {
            text: text.to_string(),
            options: options.to_vec(),
        })
    }

    async fn send_document(&self, file_name: &str, content: Vec<u8>, caption: &str) -> Result<()> {
        self.push(Sent::Document {
            file_name: file_name.to_string(),
            content,
            caption: caption.to_string(),
        })
    }
}

struct Fixture {
    _dir: tempfile::TempDir,
    desk: ResourceDesk,
    ledger: Arc<InMemoryLedger>,
    transport: RecordingTransport,
}

fn fixture(files: &[(&str, &[u8])]) -> Result<Fixture> {
    let dir = tempfile::tempdir()?;
    for (name, content) in files {
        fs::write(dir.path().join(name), content)?;
    }
    Ok(fixture_at(dir, Path::new("")))
}

fn fixture_at(dir: tempfile::TempDir, sub: &Path) -> Fixture {
    let ledger = Arc::new(InMemoryLedger::new());
    let desk = ResourceDesk::new(
        FileCatalog::new(dir.path().join(sub), "pdf"),
        ledger.clone(),
    );
    Fixture {
        _dir: dir,
        desk,
        ledger,
        transport: RecordingTransport::default(),
    }
}

fn select(name: &str) -> String {
    Action::SelectFile(FileRef::for_file(name)).encode()
}

#[tokio::test]
async fn lists_only_pdf_files() -> Result<()> {
    let f = fixture(&[("guide.pdf", b"%PDF-1.4"), ("notes.txt", b"plain")])?;

    assert_eq!(f.desk.catalog().list_available().await?, vec!["guide.pdf"]);

    f.desk.list_files(&f.transport, 42).await?;
    assert_eq!(
        f.transport.take(),
        vec![Sent::Menu {
            text: DefaultResourceView::files_header().to_string(),
            options: vec![MenuOption::for_file("guide.pdf")],
        }]
    );
    Ok(())
}

#[tokio::test]
async fn missing_directory_reports_no_files() -> Result<()> {
    let f = fixture_at(tempfile::tempdir()?, Path::new("does-not-exist"));

    assert!(f.desk.catalog().list_available().await?.is_empty());

    f.desk.list_files(&f.transport, 42).await?;
    assert_eq!(
        f.transport.take(),
        vec![Sent::Text(DefaultResourceView::no_files().to_string())]
    );
    Ok(())
}

#[tokio::test]
async fn first_selection_delivers_then_repeat_is_refused() -> Result<()> {
    let f = fixture(&[("guide.pdf", b"%PDF-1.4 guide")])?;

    f.desk
        .handle_callback(&f.transport, 42, &select("guide.pdf"))
        .await?;
    assert_eq!(
        f.transport.take(),
        vec![
            Sent::Text(DefaultResourceView::downloading().to_string()),
            Sent::Document {
                file_name: "guide.pdf".to_string(),
                content: b"%PDF-1.4 guide".to_vec(),
                caption: "📄 guide.pdf\n\nAll the best 💪".to_string(),
            },
        ]
    );
    assert!(f.ledger.has_downloaded(42, "guide.pdf").await);

    f.desk
        .handle_callback(&f.transport, 42, &select("guide.pdf"))
        .await?;
    assert_eq!(
        f.transport.take(),
        vec![Sent::Text(
            DefaultResourceView::already_downloaded().to_string()
        )]
    );
    Ok(())
}

#[tokio::test]
async fn missing_file_is_not_recorded() -> Result<()> {
    let f = fixture(&[("guide.pdf", b"%PDF-1.4")])?;

    let outcome = f
        .desk
        .select_file(&f.transport, 7, &FileRef::Name("missing.pdf".to_string()))
        .await?;

    assert_eq!(outcome, SelectionOutcome::NotFound);
    assert_eq!(
        f.transport.take(),
        vec![Sent::Text(DefaultResourceView::file_not_found().to_string())]
    );
    assert!(!f.ledger.has_downloaded(7, "missing.pdf").await);
    Ok(())
}

#[tokio::test]
async fn greeting_is_normalized() -> Result<()> {
    let f = fixture(&[])?;

    f.desk.handle_text(&f.transport, 42, " Hi ").await?;
    f.desk.handle_text(&f.transport, 42, "what files?").await?;

    assert_eq!(
        f.transport.take(),
        vec![
            Sent::Text(DefaultResourceView::greeting_message().to_string()),
            Sent::Text(DefaultResourceView::usage_hint().to_string()),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn other_users_still_receive_a_delivered_file() -> Result<()> {
    let f = fixture(&[("guide.pdf", b"%PDF-1.4")])?;

    let first = f
        .desk
        .select_file(&f.transport, 42, &FileRef::for_file("guide.pdf"))
        .await?;
    let second = f
        .desk
        .select_file(&f.transport, 7, &FileRef::for_file("guide.pdf"))
        .await?;

    assert_eq!(first, SelectionOutcome::Delivered("guide.pdf".to_string()));
    assert_eq!(second, SelectionOutcome::Delivered("guide.pdf".to_string()));
    assert_eq!(f.ledger.stats().await.records, 2);
    Ok(())
}

#[tokio::test]
async fn long_file_names_are_selectable_by_digest() -> Result<()> {
    let long_name = format!("{}.pdf", "TNPSC Group 4 previous year question paper ".repeat(2));
    let f = fixture(&[(long_name.as_str(), b"%PDF-1.4")])?;

    f.desk.list_files(&f.transport, 42).await?;
    let sent = f.transport.take();
    let Some(Sent::Menu { options, .. }) = sent.first() else {
        return Err(anyhow!("expected a menu, got {sent:?}"));
    };
    assert_eq!(options[0].label, long_name);

    let data = options[0].action.encode();
    assert!(data.starts_with("GETHASH::"));

    f.desk.handle_callback(&f.transport, 42, &data).await?;
    assert!(f.ledger.has_downloaded(42, &long_name).await);
    Ok(())
}

#[tokio::test]
async fn path_traversal_is_treated_as_missing() -> Result<()> {
    let f = fixture(&[("guide.pdf", b"%PDF-1.4")])?;

    f.desk
        .handle_callback(&f.transport, 42, "GETFILE::../guide.pdf")
        .await?;

    assert_eq!(
        f.transport.take(),
        vec![Sent::Text(DefaultResourceView::file_not_found().to_string())]
    );
    assert_eq!(f.ledger.stats().await.records, 0);
    Ok(())
}

#[tokio::test]
async fn start_offers_list_button() -> Result<()> {
    let f = fixture(&[("guide.pdf", b"%PDF-1.4")])?;

    f.desk.start(&f.transport, 42).await?;
    let sent = f.transport.take();
    let Some(Sent::Menu { text, options }) = sent.first() else {
        return Err(anyhow!("expected a menu, got {sent:?}"));
    };
    assert_eq!(text, DefaultResourceView::welcome_message());
    assert_eq!(options[0].action, Action::ListFiles);

    f.desk
        .handle_callback(&f.transport, 42, &options[0].action.encode())
        .await?;
    assert!(matches!(f.transport.take().first(), Some(Sent::Menu { .. })));
    Ok(())
}

#[tokio::test]
async fn stats_and_healthcheck_reply() -> Result<()> {
    let f = fixture(&[("a.pdf", b"%PDF"), ("b.pdf", b"%PDF")])?;
    f.ledger.record_download(42, "a.pdf").await;

    f.desk.healthcheck(&f.transport, 42).await?;
    f.desk.stats(&f.transport, 42).await?;

    let sent = f.transport.take();
    assert_eq!(sent[0], Sent::Text("OK".to_string()));
    let Sent::Text(stats) = &sent[1] else {
        return Err(anyhow!("expected stats text, got {:?}", sent[1]));
    };
    assert!(stats.contains("Available files: 2"));
    assert!(stats.contains("Users served: 1"));
    assert!(stats.contains("Files delivered: 1"));
    Ok(())
}

struct FailingUploadTransport;

#[async_trait]
impl ChatTransport for FailingUploadTransport {
    async fn send_text(&self, _text: &str) -> Result<()> {
        Ok(())
    }

    async fn send_menu(&self, _text: &str, _options: &[MenuOption]) -> Result<()> {
        Ok(())
    }

    async fn send_document(&self, _file_name: &str, _content: Vec<u8>, _caption: &str) -> Result<()> {
        Err(anyhow!("upload failed"))
    }
}

#[tokio::test]
async fn failed_upload_propagates_and_keeps_record() -> Result<()> {
    let f = fixture(&[("guide.pdf", b"%PDF-1.4")])?;

    let result = f
        .desk
        .handle_callback(&FailingUploadTransport, 42, &select("guide.pdf"))
        .await;

    let Err(e) = result else {
        return Err(anyhow!("expected the upload error to propagate"));
    };
    assert_eq!(e.to_string(), "upload failed");
    assert!(f.ledger.has_downloaded(42, "guide.pdf").await);
    Ok(())
}

#[tokio::test]
async fn unreadable_catalog_reports_unavailable() -> Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("not-a-dir"), b"plain file")?;
    let f = fixture_at(dir, Path::new("not-a-dir"));

    assert!(f.desk.catalog().list_available().await.is_err());

    f.desk.list_files(&f.transport, 42).await?;
    assert_eq!(
        f.transport.take(),
        vec![Sent::Text(
            DefaultResourceView::catalog_unavailable().to_string()
        )]
    );
    Ok(())
}
