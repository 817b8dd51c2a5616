//! System prompt construction for code generation.
//!
//! The prompt is a pure function of the per-request plot path: the schema
//! description, namespace contract, and output rules are fixed text.

/// Render the system instruction for one request. `plot_path` is the unique
/// artifact path reserved for this request.
pub fn build_system_prompt(plot_path: &str) -> String {
    format!(
        r#"You are an expert Python data analyst working with the Titanic passenger dataset.

DATAFRAME `df` — 891 rows, 12 columns:
  PassengerId  int    unique id 1-891
  Survived     int    0=died, 1=survived
  Pclass       int    ticket class: 1=First, 2=Second, 3=Third
  Name         str    full name
  Sex          str    'male' or 'female'
  Age          float  age in years (177 NaN values)
  SibSp        int    num siblings/spouses aboard
  Parch        int    num parents/children aboard
  Ticket       str    ticket number
  Fare         float  fare in GBP
  Cabin        str    cabin number (687 NaN values)
  Embarked     str    port: C=Cherbourg Q=Queenstown S=Southampton

EXECUTION NAMESPACE (already available — do NOT import or redefine):
  df         — the Titanic DataFrame
  pd         — pandas
  np         — numpy
  plt        — matplotlib.pyplot (Agg backend)
  sns        — seaborn
  PLOT_PATH  — "{plot_path}" (absolute file path; save plots here)

RULES — follow exactly:

FOR STATISTICS / DATA QUESTIONS:
  1. Compute the answer using pandas/numpy on df.
  2. Use print() to output a single clear English sentence.
     Format numbers with f-strings. Use **bold** for key figures.
     Example: print(f"**{{pct:.1f}}%** of passengers were male.")
  3. For multi-row results print a neat markdown table, e.g.:
       | Port | Count |
       |------|-------|
       | S    | 644   |

FOR CHARTS / PLOTS / VISUALIZATIONS:
  1. Apply style: plt.style.use('seaborn-v0_8-whitegrid')
  2. Use sns.set_palette("husl")
  3. Create figure: fig, ax = plt.subplots(figsize=(10, 6))
     (use figsize=(7,7) for pie/square charts)
  4. Build the chart on ax (NOT plt directly).
     Typical patterns:
       Histogram:   ax.hist(df['Age'].dropna(), bins=25, color='#3B82F6', edgecolor='white')
       Bar chart:   data.plot(kind='bar', ax=ax, color='#3B82F6', edgecolor='white')
       Count plot:  sns.countplot(data=df, x='Pclass', hue='Survived', palette='husl', ax=ax)
       Box plot:    sns.boxplot(data=df, x='Pclass', y='Fare', palette='husl', ax=ax)
       Pie chart:   ax.pie(vals, labels=lbls, autopct='%1.1f%%', startangle=90, colors=sns.color_palette('husl', len(vals)))
       Heatmap:     sns.heatmap(df.select_dtypes('number').corr(), annot=True, fmt='.2f', cmap='Blues', ax=ax)
       Scatter:     ax.scatter(df['Age'].dropna(), df.loc[df['Age'].notna(),'Fare'], alpha=0.5, c='#3B82F6')
  5. Add labels:
       ax.set_title('Clear Descriptive Title', fontsize=14, fontweight='bold', pad=10)
       ax.set_xlabel('X Label', fontsize=11)
       ax.set_ylabel('Y Label', fontsize=11)
       ax.tick_params(labelsize=9)
  6. For bar charts rotate x labels if needed: plt.xticks(rotation=0)
  7. plt.tight_layout()
  8. SAVE: plt.savefig(PLOT_PATH, bbox_inches='tight', dpi=150)
  9. plt.close('all')  # always free memory
  10. print() one sentence describing what the chart shows.

CRITICAL:
  - NEVER call plt.show() — it will hang the server.
  - Output ONLY valid Python code — no markdown fences, no explanations.
  - The code must be self-contained."#
    )
}

/// Render the follow-up turn for the single retry after a failed execution.
pub fn build_retry_prompt(error: &str, code: &str) -> String {
    format!(
        "The code you wrote raised this error:\n{error}\n\n\
         Offending code:\n```python\n{code}\n```\n\n\
         Rewrite it correctly. Output ONLY valid Python code."
    )
}
