/*!

This is the long-form manual for `voting_session` and `votebox`.

## The session lifecycle

A session starts editable: empty voter fields, no selection, a running
countdown. It moves to the submitted state through one successful
submission, and the only way back is a full reset.

```text
          submit + confirmation accepted
Editable ---------------------------------> Submitted
    ^                                           |
    +------------------- reset ----------------+
```

The confirmation step is not a persisted state. `submit` issues a
`ConfirmationRequest` and marks the session pending;
`resolve_confirmation(true)` completes the transition and
`resolve_confirmation(false)` drops the request with no other change. While a
request is outstanding, a second `submit` is rejected (`AlreadyPending`) and
field edits or selection changes are ignored, so the prompt shown to the
voter always matches what would be recorded.

## Notices

Every failed submission maps to a user-facing notice:

| condition                       | notice                                   |
|---------------------------------|------------------------------------------|
| already voted                   | "you have already submitted your choice" |
| fields missing or no selection  | names each missing piece                 |
| confirmation declined           | none (a normal cancellation)             |

A recorded vote yields a `VoteReceipt`; its `message()` names the voter for
the thank-you notice.

## The countdown

The countdown is display-only. It decrements once per `tick` while the
session is editable and above zero, and it never goes negative. Reaching
zero neither locks the form nor submits the ballot: only an explicit,
confirmed `submit` mutates the tally.

## The tally

The tally maps each candidate to its count, scoped to the lifetime of the
session instance. `reset` starts a fresh ballot but keeps the counts, which
is how several voters can share one booth in sequence.

## The terminal screen

`votebox` drives a session from a single terminal screen. The form is
edited with line commands:

```text
name <value>      fill in the voter name
id <value>        fill in the voter id
faculty <value>   fill in the faculty
program <value>   fill in the study program
pick <id>         select the candidate with this id (c1 or c2)
submit            cast the vote (asks for confirmation)
reset             clear the form, keep the tally
show              redraw the screen
quit              leave the booth
```

Per-candidate counts appear on the screen only once the vote is cast.

An election description in JSON can be passed with `--config`:

```json
{
  "contestName": "PEMILIHAN KETUA HIMPUNAN",
  "contestLines": ["Fakultas Sains dan Matematika"],
  "countdownSeconds": 80,
  "candidates": [
    { "id": "c1", "name": "CALON 1: ARYA DWI NUGRAHA" },
    { "id": "c2", "name": "CALON 2: RIFQI BANTEEKA" }
  ]
}
```

Without a file, the booth runs the default election above.

*/
