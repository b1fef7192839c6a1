use log::{debug, warn};
use std::collections::HashSet;

use super::{Book, SearchArgs};

/// 界面书架编号到书架名称的映射
pub const BOOKSHELF_ID_MAP: [(&str, &str); 15] = [
    ("466", "Philosophy & Ethics"),
    ("478", "Science (General)"),
    ("468", "Politics"),
    ("446", "History (General)"),
    ("458", "Literature"),
    ("460", "Music"),
    ("484", "Teaching & Education"),
    ("459", "Mathematics"),
    ("427", "Biographies"),
    ("486", "Fiction (General)"),
    ("480", "Science-Fiction & Fantasy"),
    ("433", "Crime/Mystery"),
    ("453", "Humour"),
    ("467", "Poetry"),
    ("485", "Travel & Geography"),
];

/// 将分类转换为书架名称
///
/// 支持 "bookshelf/480"、"480" 和直接给出的名称三种写法
///
/// # 参数
/// - `category`: 分类字符串
///
/// # 返回
/// 书架名称；"bookshelf/未知编号" 返回 None
pub fn parse_bookshelf(category: Option<&str>) -> Option<String> {
    let category = category.map(str::trim).filter(|c| !c.is_empty())?;

    let lookup = |code: &str| {
        BOOKSHELF_ID_MAP
            .iter()
            .find(|(id, _)| *id == code)
            .map(|(_, name)| name.to_string())
    };

    if let Some(code) = category.strip_prefix("bookshelf/") {
        return lookup(code);
    }

    lookup(category).or_else(|| Some(category.to_string()))
}

/// 根据世纪生成匹配模式
///
/// 世纪 "20" 生成 "20th century"、"1900s"、"1900's"、"1900-"
///
/// # 参数
/// - `century`: 世纪字符串
///
/// # 返回
/// 小写模式列表；无法解析时返回 None
pub fn century_patterns(century: &str) -> Option<Vec<String>> {
    let n: u32 = match century.trim().parse() {
        Ok(n) if (1..=21).contains(&n) => n,
        _ => {
            warn!("无法识别的世纪参数: {}", century);
            return None;
        }
    };

    let prefix = n - 1;
    let mut patterns = vec![
        format!("{}th century", n),
        format!("{}00s", prefix),
        format!("{}00's", prefix),
        format!("{}00-", prefix),
    ];

    // 21st、22nd 之类的正确序数写法
    let ordinal = format!("{}{} century", n, ordinal_suffix(n));
    if !patterns.contains(&ordinal) {
        patterns.push(ordinal);
    }

    Some(patterns)
}

fn ordinal_suffix(n: u32) -> &'static str {
    match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

fn contains_ignore_case(values: &[String], needle: &str) -> bool {
    let needle = needle.to_lowercase();
    values.iter().any(|v| v.to_lowercase().contains(&needle))
}

/// 按顺序应用作者、书架、主题、世纪和排除 ID 过滤
///
/// # 参数
/// - `books`: 检索得到的书籍
/// - `args`: 检索参数
///
/// # 返回
/// 过滤后的书籍
pub fn apply_filters(books: Vec<Book>, args: &SearchArgs) -> Vec<Book> {
    let total = books.len();
    let mut books = books;

    if let Some(author) = args.author.as_deref().filter(|a| !a.trim().is_empty()) {
        let needle = author.trim().to_lowercase();
        books.retain(|book| book.author.to_lowercase().contains(&needle));
    }

    if let Some(shelf) = args.bookshelf.as_deref().filter(|s| !s.trim().is_empty()) {
        books.retain(|book| contains_ignore_case(&book.bookshelves, shelf.trim()));
    }

    if let Some(subject) = args.subject.as_deref().filter(|s| !s.trim().is_empty()) {
        books.retain(|book| contains_ignore_case(&book.subjects, subject.trim()));
    }

    if let Some(patterns) = args.century.as_deref().and_then(century_patterns) {
        books.retain(|book| {
            patterns.iter().any(|pattern| {
                contains_ignore_case(&book.subjects, pattern)
                    || contains_ignore_case(&book.bookshelves, pattern)
            })
        });
    }

    if !args.exclude_ids.is_empty() {
        let excluded: HashSet<String> = args.exclude_ids.iter().map(|id| id.to_string()).collect();
        books.retain(|book| !excluded.contains(&book.id.to_string()));
    }

    debug!("过滤后剩余 {}/{} 本书", books.len(), total);
    books
}
