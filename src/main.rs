use anyhow::Result;

use exam_composer::clients::exam_client::HttpExamClient;
use exam_composer::config::Config;
use exam_composer::models::loaders::load_all_draft_files;
use exam_composer::persistence::BatchAdapter;
use exam_composer::utils::logging;
use exam_composer::workflow::EditorSession;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();
    logging::log_startup(&config);

    // 加载试卷草稿
    let drafts = load_all_draft_files(&config.draft_folder).await?;
    logging::log_drafts_loaded(drafts.len());

    if drafts.is_empty() {
        tracing::warn!("⚠️ 没有找到可提交的草稿，结束");
        return Ok(());
    }

    let client = HttpExamClient::new(&config)?;

    let total = drafts.len();
    let mut success = 0;
    let mut failed = 0;

    for draft in drafts {
        let title = draft.title.clone();
        let adapter = BatchAdapter::new(client.clone(), title.clone());
        let mut session = EditorSession::with_composition(adapter, draft.composition);

        match session.submit().await {
            Ok(exam_id) => {
                tracing::info!("✓ 《{}》提交成功, 试卷ID: {}", title, exam_id);
                success += 1;
            }
            Err(e) => {
                tracing::error!("❌ 《{}》提交失败: {}", title, e);
                failed += 1;
            }
        }
    }

    logging::print_final_stats(success, failed, total);

    Ok(())
}
