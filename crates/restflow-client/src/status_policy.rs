//! Status code acceptance policy.
//!
//! A code passes when it sits inside `[min_include, max_exclude)` or the
//! white list, and is absent from the black list. The black list pulls a
//! code out of an otherwise accepted range.

use restflow_core::error::ApiError;
use restflow_core::settings::StatusCodeRange;

/// Classify `status_code` against the configured policy.
pub fn evaluate(
    status_code: u16,
    range: StatusCodeRange,
    white_list: &[u16],
    black_list: &[u16],
) -> Result<(), ApiError> {
    let StatusCodeRange { min_include: min, max_exclude: max } = range;
    if (status_code < min || status_code >= max) && !white_list.contains(&status_code) {
        return Err(ApiError::StatusPolicy {
            status_code,
            message: format!(
                "Status Code [{status_code}] doesn't exist in responseCodeWhiteListRange [{min}, {max}). \
                 If you want to include {status_code} to white list, use responseCodeWhiteList settings \
                 in set_default_settings()"
            ),
        });
    }
    if black_list.contains(&status_code) {
        return Err(ApiError::StatusPolicy {
            status_code,
            message: format!(
                "Status Code [{status_code}] exists in responseCodeBlackList [{}]",
                black_list.iter().map(u16::to_string).collect::<Vec<_>>().join(",")
            ),
        });
    }
    Ok(())
}
