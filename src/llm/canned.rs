//! Keyword replies used when no chat backend answers

/// Reply when no keyword group matches
pub const DEFLECTION: &str = "ขออภัยค่ะ ยูกิยังไม่เข้าใจคำถามนี้ แต่ยูกิสามารถช่วยคุณเปิดแอปพลิเคชัน เปิดเว็บไซต์ หรือเล่นเพลงได้ค่ะ";

/// Keyword groups in priority order
const CANNED: &[(&[&str], &str)] = &[
    (
        &["สวัสดี", "hello", "hi"],
        "สวัสดีค่ะ ยูกิยินดีที่ได้รู้จักคุณ!",
    ),
    (
        &["ชื่อ", "name", "คุณคือใคร"],
        "ฉันชื่อยูกิค่ะ เป็นผู้ช่วย AI ที่พร้อมช่วยเหลือคุณ!",
    ),
    (
        &["ช่วย", "help", "ช่วยเหลือ"],
        "ยูกิสามารถช่วยคุณได้หลายอย่างค่ะ เช่น เปิดแอปพลิเคชัน เปิดเว็บไซต์ เล่นเพลง หรือตอบคำถามต่างๆ",
    ),
    (
        &["ขอบคุณ", "thank", "thanks"],
        "ยินดีค่ะ ยูกิยินดีช่วยเหลือคุณเสมอ!",
    ),
    (
        &["อาหาร", "food", "กิน", "แนะนำอาหาร"],
        "อาหารไทยมีหลากหลายและอร่อยมากค่ะ เช่น ต้มยำกุ้ง ผัดไทย ส้มตำ แกงเขียวหวาน ลาบ น้ำพริก และข้าวผัดกุ้ง",
    ),
    (
        &["ประเทศไทย", "thailand", "ไทย"],
        "ประเทศไทยเป็นประเทศที่สวยงามในเอเชียตะวันออกเฉียงใต้ มีวัฒนธรรมที่หลากหลาย อาหารอร่อย และผู้คนเป็นมิตรค่ะ",
    ),
];

/// Canned reply for a command: first keyword group with a case-insensitive
/// substring hit, else [`DEFLECTION`]
#[must_use]
pub fn canned_reply(command: &str) -> &'static str {
    let lowered = command.to_lowercase();
    CANNED
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map_or(DEFLECTION, |(_, reply)| *reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_group_wins() {
        // "hi" is a plain substring here, matching the greeting group first
        assert_eq!(canned_reply("Thank you, HI"), "สวัสดีค่ะ ยูกิยินดีที่ได้รู้จักคุณ!");
        assert_eq!(canned_reply("THANKS a lot"), "ยินดีค่ะ ยูกิยินดีช่วยเหลือคุณเสมอ!");
        assert!(canned_reply("แนะนำอาหารหน่อย").starts_with("อาหารไทย"));
    }

    #[test]
    fn test_deflection() {
        assert_eq!(canned_reply("2 + 2 เท่ากับเท่าไหร่"), DEFLECTION);
        assert_eq!(canned_reply(""), DEFLECTION);
    }
}
