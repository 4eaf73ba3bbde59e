use crate::common::error::ServiceResult;
use crate::models::queue::ScoreItem;
use discord_webhook2::message::Message;
use discord_webhook2::webhook::DiscordWebhook;
use iso8061_timestamp::Timestamp;

const ERROR_COLOR: u32 = 0xff3b30;

/// Announces a score that was moved to the failed queue.
pub async fn quarantined(
    webhook_url: Option<&str>,
    item: &ScoreItem,
    error_code: &str,
) -> ServiceResult<()> {
    let description = format!(
        "Score {} was quarantined after {} tries: `{error_code}`",
        item.score_id,
        item.tries + 1,
    );
    send(webhook_url, "Score processing failed", &description, ERROR_COLOR).await
}

pub async fn send(
    webhook_url: Option<&str>,
    title: &str,
    description: &str,
    color: u32,
) -> ServiceResult<()> {
    let Some(webhook_url) = webhook_url else {
        tracing::warn!(title, description, "Discord Webhook url not set");
        return Ok(());
    };

    let webhook = DiscordWebhook::new(webhook_url)?;
    webhook
        .send(&Message::new(|message| {
            message.embed(|embed| {
                embed
                    .description(description)
                    .author(|author| author.name(title))
                    .color(color)
                    .footer(|footer| footer.text("score-statistics-processor"))
                    .timestamp(Timestamp::now_utc())
            })
        }))
        .await?;

    Ok(())
}
