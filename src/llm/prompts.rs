pub const EXTRACT_WORDS: &str = r#"Please analyze this image and extract all English words you can see.
Follow these rules:
1. Only extract clear, readable English words
2. Ignore numbers, symbols, and non-English text
3. Return each word only once (no duplicates)
4. Focus on common vocabulary words suitable for learning
5. Exclude very short words (1-2 letters) unless they are common words like "is", "to", "of"

Return the words as a JSON array of lowercase strings, like this:
["word1", "word2", "word3"]

Respond with the JSON array only. If no English words are found, return an empty array: []"#;

pub const CONNECTION_TEST: &str = "Hello, this is a test.";

pub fn translate_words(words: &[String]) -> String {
    format!(
        r#"Translate the following English words to Chinese.
Return the result as a JSON array of objects with this format:
[
  {{"english": "word1", "chinese": "中文翻译1"}},
  {{"english": "word2", "chinese": "中文翻译2"}}
]

Words to translate: {}

Rules:
1. Provide the most common/basic translation for each word
2. Use simplified Chinese characters
3. For words with multiple meanings, choose the most general one
4. Keep translations concise (1-3 characters when possible)
5. Respond with the JSON array only"#,
        words.join(", ")
    )
}
