//! 统计用伪设备标识（由远端仓库地址确定性派生）
use serde::Serialize;

const URL_SALT: &str = "1n1T-$@Lt-";
const SALT_SALT: &str = "$eC0nd-$@Lt-";
const DEVICE_PREFIX: &str = "200820300000000";
/// 远端地址为空时使用的占位哈希
const EMPTY_HASH: &str = "00000000000000000000000000000000";

/// (device id, salt) 对
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceIdentity {
    pub device_id: String,
    pub salt: String,
}

impl DeviceIdentity {
    /// 完全由远端地址派生；相同地址得到相同结果
    pub fn derive(remote_url: &str) -> Self {
        let hash = url_hash(remote_url);
        Self { device_id: device_id_from(&hash), salt: salt_from(&hash) }
    }

    /// 环境提供的值优先；任一缺失（或为空）时只补齐缺失的那个
    pub fn resolve(env_device_id: Option<&str>, env_salt: Option<&str>, remote_url: &str) -> Self {
        let device_id = env_device_id.filter(|s| !s.is_empty());
        let salt = env_salt.filter(|s| !s.is_empty());
        if let (Some(device_id), Some(salt)) = (device_id, salt) {
            return Self { device_id: device_id.to_string(), salt: salt.to_string() };
        }
        let hash = url_hash(remote_url);
        Self {
            device_id: device_id.map(str::to_string).unwrap_or_else(|| device_id_from(&hash)),
            salt: salt.map(str::to_string).unwrap_or_else(|| salt_from(&hash)),
        }
    }
}

fn md5_hex(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}

fn url_hash(remote_url: &str) -> String {
    if remote_url.is_empty() {
        return EMPTY_HASH.to_string();
    }
    md5_hex(format!("{URL_SALT}{remote_url}").as_bytes())
}

fn salt_from(hash: &str) -> String {
    md5_hex(format!("{SALT_SALT}{hash}").as_bytes())
}

fn device_id_from(hash: &str) -> String {
    format!(
        "{}-{}-{}-{}-{}",
        DEVICE_PREFIX,
        &hash[0..4],
        &hash[4..8],
        &hash[8..12],
        &hash[12..24]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_url_uses_zero_placeholder() {
        let id = DeviceIdentity::derive("");
        assert_eq!(id.device_id, "200820300000000-0000-0000-0000-000000000000");
        assert_eq!(id.salt, md5_hex(b"$eC0nd-$@Lt-00000000000000000000000000000000"));
    }

    #[test]
    fn derivation_is_stable_and_url_specific() {
        let a = DeviceIdentity::derive("https://github.com/acme/app.git");
        let b = DeviceIdentity::derive("https://github.com/acme/app.git");
        let c = DeviceIdentity::derive("https://github.com/acme/other.git");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a.device_id, a.salt);
        let hash = md5_hex(b"1n1T-$@Lt-https://github.com/acme/app.git");
        assert!(a.device_id.ends_with(&hash[12..24]));
        assert_eq!(a.device_id.len(), DEVICE_PREFIX.len() + 4 * 4 + 12);
    }

    #[test]
    fn env_values_win_and_only_missing_are_derived() {
        let url = "git@example.com:team/repo.git";
        let both = DeviceIdentity::resolve(Some("dev"), Some("salt"), url);
        assert_eq!(both, DeviceIdentity { device_id: "dev".into(), salt: "salt".into() });

        let derived = DeviceIdentity::derive(url);
        let only_salt = DeviceIdentity::resolve(None, Some("salt"), url);
        assert_eq!(only_salt.salt, "salt");
        assert_eq!(only_salt.device_id, derived.device_id);

        let empty = DeviceIdentity::resolve(Some(""), None, url);
        assert_eq!(empty, derived);
    }
}
