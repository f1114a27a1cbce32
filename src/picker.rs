//! Line-driven read-more picker / 交互式链接选择
//!
//! Plain lines edit the keyword; `:page N`, `:size N`, `:select ID`, `:show`
//! and `:quit` drive the rest. Settled results are printed as they arrive.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use readmore_backend::search::{IncrementalSearchController, SessionSnapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerInput {
    Keyword(String),
    Page(String),
    Size(String),
    Select(i64),
    Show,
    Quit,
    Unknown(String),
}

pub fn parse_input(line: &str) -> PickerInput {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(command) = line.strip_prefix(':') else {
        return PickerInput::Keyword(line.to_string());
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command.trim(), ""),
    };
    match name {
        "page" => PickerInput::Page(arg.to_string()),
        "size" => PickerInput::Size(arg.to_string()),
        "select" => match arg.parse() {
            Ok(id) => PickerInput::Select(id),
            Err(_) => PickerInput::Unknown(line.to_string()),
        },
        "show" => PickerInput::Show,
        "quit" | "q" => PickerInput::Quit,
        _ => PickerInput::Unknown(line.to_string()),
    }
}

/// Text view of a snapshot / 渲染快照
pub fn render(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();
    if snapshot.keyword.trim().is_empty() {
        out.push_str("Type to search posts.\n");
    } else {
        out.push_str(&format!(
            "Results for '{}' (page {} of {}, {} per page)\n",
            snapshot.keyword,
            snapshot.page,
            snapshot.total_pages.max(1),
            snapshot.page_size
        ));
        if snapshot.items.is_empty() {
            out.push_str("  No posts found.\n");
        }
        for item in &snapshot.items {
            out.push_str(&format!("  {}\n", item));
        }
    }
    if let Some(e) = &snapshot.last_error {
        out.push_str(&format!("Warning: {}\n", e));
    }
    if let Some(item) = &snapshot.selected {
        out.push_str(&format!("{}\n", item.read_more_html()));
    }
    out
}

/// Same listing, whatever the selection / 忽略选中项比较
fn same_listing(a: &SessionSnapshot, b: &SessionSnapshot) -> bool {
    a.keyword == b.keyword
        && a.page == b.page
        && a.page_size == b.page_size
        && a.total_pages == b.total_pages
        && a.items == b.items
        && a.last_error == b.last_error
}

async fn emit<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> anyhow::Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.flush().await?;
    Ok(())
}

/// Run until `:quit` or end of input / 运行选择循环
pub async fn run<R, W>(
    controller: &IncrementalSearchController,
    input: R,
    output: &mut W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut snapshots = controller.subscribe();
    let mut shown: Option<SessionSnapshot> = None;

    emit(output, &render(&controller.snapshot())).await?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    PickerInput::Keyword(keyword) => controller.on_keyword_change(keyword)?,
                    PickerInput::Page(raw) => controller.on_page_change(raw)?,
                    PickerInput::Size(raw) => controller.on_page_size_change(raw)?,
                    PickerInput::Select(id) => match controller.on_select(id).await {
                        Ok(item) => emit(output, &format!("{}\n", item.read_more_html())).await?,
                        Err(e) => emit(output, &format!("Error: {}\n", e)).await?,
                    },
                    PickerInput::Show => emit(output, &render(&controller.snapshot())).await?,
                    PickerInput::Quit => break,
                    PickerInput::Unknown(line) => {
                        emit(output, &format!("Error: unknown command '{}'\n", line)).await?
                    }
                }
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if snapshot.loading {
                    continue;
                }
                // Selections were already printed by `:select`
                if let Some(previous) = shown.as_mut() {
                    if same_listing(previous, &snapshot) {
                        *previous = snapshot;
                        continue;
                    }
                }
                emit(output, &render(&snapshot)).await?;
                shown = Some(snapshot);
            }
        }
    }

    Ok(())
}
