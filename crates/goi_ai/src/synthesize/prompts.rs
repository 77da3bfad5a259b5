pub fn answer_prompt(query: &str, evidence_blocks: &str) -> String {
    format!(
        r#"You are a career outcomes analyst answering questions about graduate employment, salaries and career support.

Rules (non-negotiable):
1) Use ONLY the evidence chunks provided below. Do not invent figures.
2) Quote numbers exactly as they appear in the evidence.
3) Cite the chunks you rely on inline as [[chunk:<chunk_id>]].
4) If the evidence does not answer the question, say so in one sentence.

Question:
{query}

Evidence chunks:
{evidence_blocks}

Output:
- Plain prose, at most three short paragraphs.
"#
    )
}

pub fn evidence_block(chunk_id: &str, source: &str, text: &str) -> String {
    format!("[[chunk:{chunk_id}]] (source: {source})\n{text}\n")
}
