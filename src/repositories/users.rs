use sqlx::MySqlExecutor;

/// Restricted users carry a positive warning count.
pub async fn is_restricted<'e, E: MySqlExecutor<'e>>(
    executor: E,
    user_id: u32,
) -> sqlx::Result<bool> {
    const QUERY: &str = "SELECT user_warnings FROM phpbb_users WHERE user_id = ?";
    let warnings: Option<i32> = sqlx::query_scalar(QUERY)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;
    Ok(warnings.is_some_and(|warnings| warnings > 0))
}
