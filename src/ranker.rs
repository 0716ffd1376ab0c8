/// Index of the first article holding the highest score. Placeholders take part with a
/// score of zero.
pub(crate) fn index_of_max(
    results: &[crate::article::ArticleRecord],
) -> Result<usize, crate::error::Error> {
    let Some(first) = results.first() else {
        return Err(crate::error::Error::EmptyInput);
    };

    let mut highest_score = first.score;
    let mut highest_index = 0;

    for (index, article) in results.iter().enumerate().skip(1) {
        if article.score > highest_score {
            highest_score = article.score;
            highest_index = index;
        }
    }

    Ok(highest_index)
}
