use super::scoring_engine::split_token;
use super::types::{Answer, PassageMetadata, PassageResult};

/// 把选中的词替换为等长的下划线
///
/// 词首词尾的标点保留
pub fn blank_out(token: &str) -> (String, String) {
    let (leading, core, trailing) = split_token(token);
    let blank = "_".repeat(core.chars().count());
    (format!("{}{}{}", leading, blank, trailing), core.to_string())
}

/// 组装段落和答案
///
/// # 参数
/// - `paragraphs`: 已分词的段落
/// - `selected`: 每个段落中选中的词下标
/// - `metadata`: 来源信息
///
/// # 返回
/// 完整的生成结果，答案按段落、词下标排序
pub fn assemble(
    paragraphs: &[Vec<&str>],
    selected: &[Vec<usize>],
    metadata: PassageMetadata,
) -> PassageResult {
    let mut answers = Vec::new();
    let mut rendered = Vec::with_capacity(paragraphs.len());

    for (paragraph_index, words) in paragraphs.iter().enumerate() {
        let chosen = selected.get(paragraph_index).map(Vec::as_slice).unwrap_or(&[]);

        let tokens: Vec<String> = words
            .iter()
            .enumerate()
            .map(|(word_index, word)| {
                if !chosen.contains(&word_index) {
                    return word.to_string();
                }
                let (blanked, answer) = blank_out(word);
                answers.push(Answer {
                    paragraph_index,
                    word_index,
                    answer,
                });
                blanked
            })
            .collect();

        rendered.push(tokens.join(" "));
    }

    PassageResult {
        paragraphs: rendered,
        answers,
        metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Book, BookId};

    fn create_test_metadata() -> PassageMetadata {
        PassageMetadata::from_book(&Book {
            id: BookId::Number(1342),
            title: "Pride and Prejudice".to_string(),
            author: "Austen, Jane".to_string(),
            text: String::new(),
            subjects: vec![],
            bookshelves: vec![],
        })
    }

    #[test]
    fn test_blank_out_keeps_punctuation() {
        assert_eq!(blank_out("river."), ("_____.".to_string(), "river".to_string()));
        assert_eq!(blank_out("\"Hello,"), ("\"_____,".to_string(), "Hello".to_string()));
        assert_eq!(blank_out("café"), ("____".to_string(), "café".to_string()));
    }

    #[test]
    fn test_assemble() {
        let paragraphs = vec![
            vec!["The", "farmer", "walked", "to", "the", "river."],
            vec!["His", "dog", "barked", "loudly."],
        ];
        let selected = vec![vec![1, 5], vec![3]];
        let result = assemble(&paragraphs, &selected, create_test_metadata());

        assert_eq!(result.paragraphs[0], "The ______ walked to the _____.");
        assert_eq!(result.answers.len(), 3);
        assert_eq!(result.answers[0].answer, "farmer");
        assert_eq!(result.answers[1].word_index, 5);
        assert_eq!(result.answers[2].paragraph_index, 1);
        assert_eq!(result.answers[2].answer, "loudly");
        assert_eq!(
            result.metadata.canonical_url.as_deref(),
            Some("https://www.gutenberg.org/ebooks/1342")
        );
    }

    #[test]
    fn test_blank_length_matches_answer() {
        let paragraphs = vec![vec!["Extraordinary", "circumstances", "(rarely)", "arise."]];
        let selected = vec![vec![0, 2]];
        let result = assemble(&paragraphs, &selected, create_test_metadata());

        let tokens: Vec<&str> = result.paragraphs[0].split(' ').collect();
        for answer in &result.answers {
            let blanks = tokens[answer.word_index].chars().filter(|&c| c == '_').count();
            assert_eq!(blanks, answer.answer.chars().count());
        }
    }
}
