use anyhow::Result;
use async_trait::async_trait;
use miao_chat::prompt::{KNOWLEDGE_HIT_PREFIX, KNOWLEDGE_MISS};
use miao_chat::{Assistant, ChatCompletion, MessageSource, PromptMessage, SessionList};
use miao_knowledge::{LexicalSearch, loader};
use std::process::Command;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Echoes the knowledge instruction back as the reply.
#[derive(Default)]
struct EchoCompletion {
    prompts: Mutex<Vec<Vec<PromptMessage>>>,
}

#[async_trait]
impl ChatCompletion for EchoCompletion {
    async fn complete(&self, messages: &[PromptMessage]) -> miao_chat::Result<String> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        let instruction = &messages[messages.len() - 2].content;
        Ok(format!("{instruction}喵"))
    }

    fn model_name(&self) -> &str {
        "echo"
    }
}

fn write_kb(temp_dir: &TempDir) -> Result<std::path::PathBuf> {
    let path = temp_dir.path().join("kb.json");
    std::fs::write(
        &path,
        r#"{
  "categories": [
    {
      "name": "产品",
      "keywords": ["产品", "功能"],
      "subcategories": [
        {
          "name": "使用",
          "keywords": ["使用", "怎么"],
          "items": [
            { "question": "怎么导入知识库", "answer": "在设置页选择文件即可导入。" }
          ]
        }
      ]
    }
  ]
}"#,
    )?;
    Ok(path)
}

fn run_cli(args: &[&str]) -> Result<std::process::Output> {
    let output = Command::new(env!("CARGO_BIN_EXE_miao-chat"))
        .args(args)
        .env_remove("DEEPSEEK_API_KEY")
        .env_remove("DEEPSEEK_BASE_URL")
        .env("RUST_LOG", "error")
        .output()?;
    Ok(output)
}

#[tokio::test]
async fn test_conversation_over_loaded_knowledge_base() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let (kb, _) = loader::load(&write_kb(&temp_dir)?)?;

    let completion = Arc::new(EchoCompletion::default());
    let assistant = Assistant::new(Arc::new(LexicalSearch::new(Arc::new(kb))), completion.clone());
    let mut sessions = SessionList::new();

    let hit = assistant
        .ask(sessions.current_mut(), "怎么导入知识库")
        .await?
        .expect("non-blank input");
    assert_eq!(hit.reply.source, Some(MessageSource::KnowledgeBase));
    assert_eq!(
        hit.reply.content,
        format!("{KNOWLEDGE_HIT_PREFIX}在设置页选择文件即可导入。喵")
    );
    assert_eq!(hit.knowledge.unwrap().tags.len(), 2);

    let miss = assistant
        .ask(sessions.current_mut(), "今天天气如何")
        .await?
        .expect("non-blank input");
    assert_eq!(miss.reply.source, Some(MessageSource::Llm));
    assert_eq!(miss.reply.content, format!("{KNOWLEDGE_MISS}喵"));

    // greeting + two exchanges
    assert_eq!(sessions.current().len(), 5);
    assert_eq!(sessions.current().title, "怎么导入知识库");
    Ok(())
}

#[tokio::test]
async fn test_sessions_keep_separate_histories() -> Result<()> {
    let completion = Arc::new(EchoCompletion::default());
    let kb = miao_knowledge::KnowledgeBase::sample();
    let mut assistant = Assistant::new(Arc::new(LexicalSearch::new(Arc::new(kb))), completion.clone());
    assistant.set_multi_turn(true);

    let mut sessions = SessionList::new();
    let first = sessions.current().id.clone();
    assistant.ask(sessions.current_mut(), "第一个会话").await?;

    sessions.create();
    assistant.ask(sessions.current_mut(), "第二个会话").await?;

    let prompts = completion.prompts.lock().unwrap();
    // system + greeting + question + two instructions
    assert_eq!(prompts[1].len(), 5);
    assert!(prompts[1].iter().all(|m| m.content != "第一个会话"));

    sessions.select(&first)?;
    assert_eq!(sessions.current().title, "第一个会话");
    Ok(())
}

#[test]
fn test_cli_config_masks_api_key() -> Result<()> {
    let output = run_cli(&["--api-key", "sk-abcdefgh12345678wxyz", "config"])?;
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("sk-abcde...wxyz"));
    assert!(!stdout.contains("sk-abcdefgh12345678wxyz"));
    assert!(stdout.contains("deepseek-chat"));
    Ok(())
}

#[test]
fn test_cli_ask_requires_api_key() -> Result<()> {
    let output = run_cli(&["ask", "什么是人工智能？"])?;
    assert!(!output.status.success());

    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("No API key configured"));
    Ok(())
}

#[test]
fn test_cli_rejects_invalid_base_url() -> Result<()> {
    let output = run_cli(&["--base-url", "api.deepseek.com", "config"])?;
    assert!(!output.status.success());

    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("base_url must be an http(s) URL"));
    Ok(())
}
