//! 一次性验证码生成

use rand::Rng;

/// 验证码位数
pub const OTP_LENGTH: usize = 6;

/// 生成 6 位数字验证码
///
/// 保留前导零，长度恒定。不做重复规避。
pub fn generate_otp() -> String {
    let code: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", code)
}
